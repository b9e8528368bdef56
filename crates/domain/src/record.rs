//! Character records
//!
//! A record is a free-form JSON object describing one creature. Only two
//! fields are structural: the name and the type. Everything else passes
//! through untouched, in the order the author wrote it.
//!
//! Records reach the system in two spellings:
//! - user-submitted JSON (`Name`/`Type`, `name`/`type`, or the French `Nom`/`nom`)
//! - generation payloads, whose keys are lowercased on ingestion (`nom`, `type`)

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Canonical key for the record's name.
pub const NAME_KEY: &str = "Name";
/// Canonical key for the record's type.
pub const TYPE_KEY: &str = "Type";

/// Aliases copied under `Name` when it is absent, in priority order.
pub const NAME_ALIASES: &[&str] = &["name", "Nom", "nom"];
/// Aliases copied under `Type` when it is absent.
pub const TYPE_ALIASES: &[&str] = &["type"];

const NAME_ACCEPTED: &str = "Name, name, Nom, nom";
const TYPE_ACCEPTED: &str = "Type, type";

const DESCRIPTION_KEYS: &[&str] = &["Description", "description"];
const PERSONALITY_KEYS: &[&str] = &[
    "Personality",
    "personality",
    "Personnalite",
    "personnalite",
    "personalite",
    "Personnalité",
    "personnalité",
];
const STATS_KEYS: &[&str] = &["Stats", "stats"];

/// One creature, as an ordered JSON mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CharacterRecord(Map<String, Value>);

impl CharacterRecord {
    /// Parse and validate user-submitted JSON text.
    ///
    /// The canonical `Name`/`Type` keys are filled from their aliases when
    /// absent. An existing canonical key is never overwritten. After
    /// aliasing both must hold a non-blank string.
    ///
    /// # Errors
    ///
    /// - `ValidationError::MalformedInput` if the text is not a JSON object
    /// - `ValidationError::MissingRequiredField` if the name or type is missing
    pub fn normalize(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)?;
        let mut fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(ValidationError::malformed(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        apply_alias(&mut fields, NAME_KEY, NAME_ALIASES);
        apply_alias(&mut fields, TYPE_KEY, TYPE_ALIASES);

        require_text(&fields, NAME_KEY, NAME_ACCEPTED)?;
        require_text(&fields, TYPE_KEY, TYPE_ACCEPTED)?;

        Ok(Self(fields))
    }

    /// Wrap a generation-payload entry whose keys are already normalized.
    pub(crate) fn from_batch_entry(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// The record's name, under its canonical key or any alias.
    pub fn name(&self) -> Option<&str> {
        self.first_str(std::iter::once(NAME_KEY).chain(NAME_ALIASES.iter().copied()))
    }

    /// The record's type, under its canonical key or alias.
    pub fn record_type(&self) -> Option<&str> {
        self.first_str(std::iter::once(TYPE_KEY).chain(TYPE_ALIASES.iter().copied()))
    }

    /// Display-oriented view of the well-known fields.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            name: self.name().unwrap_or_default().to_string(),
            record_type: self.record_type().unwrap_or_default().to_string(),
            description: self.first_text(DESCRIPTION_KEYS),
            personality: self.first_text(PERSONALITY_KEYS),
            stats: self.first_text(STATS_KEYS),
        }
    }

    /// Field-for-field pretty JSON dump ("identity card").
    pub fn to_pretty_json(&self) -> String {
        format!("{:#}", Value::Object(self.0.clone()))
    }

    fn first_str<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&str> {
        keys.into_iter()
            .find_map(|key| self.0.get(key).and_then(Value::as_str))
    }

    fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .find_map(|key| self.0.get(*key))
            .map(|value| match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }
}

/// Normalize a champion and an adversary independently, so a failure on one
/// side never hides the outcome of the other.
pub fn validate_pair(
    champion_raw: &str,
    adversary_raw: &str,
) -> (
    Result<CharacterRecord, ValidationError>,
    Result<CharacterRecord, ValidationError>,
) {
    (
        CharacterRecord::normalize(champion_raw),
        CharacterRecord::normalize(adversary_raw),
    )
}

/// The well-known fields of a record, rendered as text.
///
/// Stats may be nested JSON in the source record; they are flattened to
/// their compact JSON text here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub description: Option<String>,
    pub personality: Option<String>,
    pub stats: Option<String>,
}

fn apply_alias(fields: &mut Map<String, Value>, canonical: &str, aliases: &[&str]) {
    if fields.contains_key(canonical) {
        return;
    }
    if let Some(value) = aliases.iter().find_map(|alias| fields.get(*alias)).cloned() {
        fields.insert(canonical.to_string(), value);
    }
}

fn require_text(
    fields: &Map<String, Value>,
    field: &'static str,
    accepted: &'static str,
) -> Result<(), ValidationError> {
    match fields.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::MissingRequiredField { field, accepted }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
