//! Generated batches
//!
//! A generated batch is the ordered list of records returned by one
//! generation request. Ingestion is tolerant of payload shape: the list is
//! taken from the `pokemon` key, or from the sole top-level key when the
//! service named it differently. Record keys are lowercased and trimmed so
//! downstream lookups see one spelling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{LookupError, ValidationError};
use crate::record::{json_kind, CharacterRecord};

/// Preferred top-level key of a generation payload.
pub const BATCH_KEY: &str = "pokemon";

/// Columns accepted as the name column, in priority order.
pub const NAME_COLUMNS: &[&str] = &["name", "nom"];

const NAME_COLUMNS_TEXT: &str = "name, nom";

/// Number of records requested from the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct BatchSize(u8);

impl BatchSize {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(size) if (Self::MIN..=Self::MAX).contains(&size) => Ok(Self(size)),
            _ => Err(ValidationError::InvalidBatchSize {
                value,
                min: Self::MIN,
                max: Self::MAX,
            }),
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<i64> for BatchSize {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BatchSize> for u8 {
    fn from(size: BatchSize) -> u8 {
        size.0
    }
}

/// Ordered records produced by one generation request. Serializes as the
/// plain list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GeneratedBatch {
    records: Vec<CharacterRecord>,
}

impl GeneratedBatch {
    /// Parse a generation payload into a batch.
    ///
    /// Resolution is two-step: the `pokemon` key if present, else the sole
    /// top-level key. Anything else is rejected rather than guessed at.
    ///
    /// # Errors
    ///
    /// - `MalformedInput` if the payload is not a JSON object
    /// - `EmptyPayload` if the object has no keys
    /// - `AmbiguousPayload` if it has several keys and none is `pokemon`
    /// - `InvalidBatchShape` if the resolved value is not a list of objects
    pub fn ingest(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)?;
        let mut payload = match value {
            Value::Object(map) => map,
            other => {
                return Err(ValidationError::malformed(format!(
                    "expected a JSON object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let list = match payload.remove(BATCH_KEY) {
            Some(list) => list,
            None => take_sole_value(payload)?,
        };

        let entries = match list {
            Value::Array(entries) => entries,
            other => {
                return Err(ValidationError::invalid_shape(format!(
                    "expected a list of records, found {}",
                    json_kind(&other)
                )))
            }
        };

        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| match entry {
                Value::Object(fields) => Ok(CharacterRecord::from_batch_entry(
                    normalize_keys(fields),
                )),
                other => Err(ValidationError::invalid_shape(format!(
                    "entry {} is {}, expected an object",
                    index,
                    json_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { records })
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union of all record keys, in first-seen order (the table header).
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for key in self.records.iter().flat_map(CharacterRecord::keys) {
            if !columns.contains(&key) {
                columns.push(key);
            }
        }
        columns
    }

    /// The column holding record names, if any record has one.
    pub fn name_column(&self) -> Option<&'static str> {
        NAME_COLUMNS.iter().copied().find(|column| {
            self.records
                .iter()
                .any(|record| record.get(column).is_some())
        })
    }

    /// Find the single record whose name matches `chosen_name`, ignoring case
    /// and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// - `NoNameColumn` if no record has a `name`/`nom` key
    /// - `NotFound` if nothing matches
    /// - `AmbiguousName` if several records match
    pub fn resolve(&self, chosen_name: &str) -> Result<&CharacterRecord, LookupError> {
        let column = self.name_column().ok_or(LookupError::NoNameColumn {
            expected: NAME_COLUMNS_TEXT,
        })?;
        let wanted = chosen_name.trim().to_lowercase();

        let mut matches = self.records.iter().filter(|record| {
            record
                .get(column)
                .and_then(Value::as_str)
                .is_some_and(|name| name.trim().to_lowercase() == wanted)
        });

        let first = matches
            .next()
            .ok_or_else(|| LookupError::NotFound(chosen_name.to_string()))?;
        let extra = matches.count();
        if extra > 0 {
            return Err(LookupError::AmbiguousName {
                name: chosen_name.to_string(),
                count: extra + 1,
            });
        }
        Ok(first)
    }
}

fn take_sole_value(payload: Map<String, Value>) -> Result<Value, ValidationError> {
    if payload.len() > 1 {
        return Err(ValidationError::AmbiguousPayload {
            keys: payload.keys().cloned().collect(),
        });
    }
    payload
        .into_iter()
        .next()
        .map(|(_, value)| value)
        .ok_or(ValidationError::EmptyPayload)
}

/// Lowercase and trim every key. On collision the first spelling wins.
fn normalize_keys(fields: Map<String, Value>) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(fields.len());
    for (key, value) in fields {
        let key = key.trim().to_lowercase();
        if !normalized.contains_key(&key) {
            normalized.insert(key, value);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_with_names(names: &[&str]) -> GeneratedBatch {
        let entries: Vec<Value> = names
            .iter()
            .map(|name| serde_json::json!({"Nom": name, "Type": "Eau"}))
            .collect();
        let payload = serde_json::json!({ "pokemon": entries });
        GeneratedBatch::ingest(&payload.to_string()).unwrap()
    }

    #[test]
    fn test_ingest_lowercases_keys() {
        let batch = GeneratedBatch::ingest(r#"{"pokemon":[{"Nom":"A","Type":"Feu"}]}"#).unwrap();
        assert_eq!(batch.len(), 1);
        let record = &batch.records()[0];
        assert_eq!(record.get("nom").unwrap(), "A");
        assert_eq!(record.get("type").unwrap(), "Feu");
        assert!(record.get("Nom").is_none());
    }

    #[test]
    fn test_ingest_trims_keys_and_keeps_first_on_collision() {
        let batch =
            GeneratedBatch::ingest(r#"{"pokemon":[{" Nom ":"First","nom":"Second"}]}"#).unwrap();
        assert_eq!(batch.records()[0].get("nom").unwrap(), "First");
        assert_eq!(batch.records()[0].fields().len(), 1);
    }

    #[test]
    fn test_ingest_falls_back_to_sole_key() {
        let batch =
            GeneratedBatch::ingest(r#"{"creatures":[{"Nom":"A"},{"Nom":"B"}]}"#).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records()[1].name(), Some("B"));
    }

    #[test]
    fn test_ingest_prefers_pokemon_key() {
        let batch = GeneratedBatch::ingest(
            r#"{"meta":{"count":1},"pokemon":[{"Nom":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_ingest_empty_payload() {
        assert_eq!(
            GeneratedBatch::ingest("{}").unwrap_err(),
            ValidationError::EmptyPayload
        );
    }

    #[test]
    fn test_ingest_ambiguous_payload() {
        let err = GeneratedBatch::ingest(r#"{"a":[],"b":[]}"#).unwrap_err();
        assert_eq!(
            err,
            ValidationError::AmbiguousPayload {
                keys: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_ingest_rejects_bad_shapes() {
        assert!(matches!(
            GeneratedBatch::ingest(r#"{"pokemon":{"Nom":"A"}}"#),
            Err(ValidationError::InvalidBatchShape(_))
        ));
        assert!(matches!(
            GeneratedBatch::ingest(r#"{"pokemon":["A"]}"#),
            Err(ValidationError::InvalidBatchShape(_))
        ));
        assert!(matches!(
            GeneratedBatch::ingest("not json"),
            Err(ValidationError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let batch = GeneratedBatch::ingest(
            r#"{"pokemon":[{"Nom":"A","Type":"Feu"},{"Nom":"B","Stats":"x"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.columns(), vec!["nom", "type", "stats"]);
    }

    #[test]
    fn test_serializes_as_record_list() {
        let batch = GeneratedBatch::ingest(r#"{"pokemon":[{"Nom":"A","Type":"Feu"}]}"#).unwrap();
        assert_eq!(
            serde_json::to_string(&batch).unwrap(),
            r#"[{"nom":"A","type":"Feu"}]"#
        );
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let batch = batch_with_names(&["Aquashock", "Flamgeist"]);
        let record = batch.resolve("aquashock").unwrap();
        assert_eq!(record.name(), Some("Aquashock"));
        let record = batch.resolve("  FLAMGEIST ").unwrap();
        assert_eq!(record.name(), Some("Flamgeist"));
    }

    #[test]
    fn test_resolve_not_found() {
        let batch = batch_with_names(&["Aquashock", "Flamgeist"]);
        assert_eq!(
            batch.resolve("Ghostname").unwrap_err(),
            LookupError::NotFound("Ghostname".to_string())
        );
    }

    #[test]
    fn test_resolve_ambiguous() {
        let batch = batch_with_names(&["Aquashock", "AQUASHOCK", "Flamgeist"]);
        assert_eq!(
            batch.resolve("aquashock").unwrap_err(),
            LookupError::AmbiguousName {
                name: "aquashock".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_resolve_without_name_column() {
        let batch = GeneratedBatch::ingest(r#"{"pokemon":[{"Type":"Feu"}]}"#).unwrap();
        assert!(matches!(
            batch.resolve("A"),
            Err(LookupError::NoNameColumn { .. })
        ));
    }

    #[test]
    fn test_english_name_column_preferred() {
        let batch = GeneratedBatch::ingest(
            r#"{"pokemon":[{"Name":"Aquashock","Nom":"Aquachoc"}]}"#,
        )
        .unwrap();
        assert_eq!(batch.name_column(), Some("name"));
        assert!(batch.resolve("Aquashock").is_ok());
        assert!(batch.resolve("Aquachoc").is_err());
    }

    #[test]
    fn test_batch_size_bounds() {
        assert_eq!(BatchSize::default().get(), 3);
        assert_eq!(BatchSize::new(10).unwrap().get(), 10);
        assert!(matches!(
            BatchSize::new(2),
            Err(ValidationError::InvalidBatchSize { value: 2, .. })
        ));
        assert!(BatchSize::new(11).is_err());
        let parsed: Result<BatchSize, _> = serde_json::from_str("12");
        assert!(parsed.is_err());
    }
}
