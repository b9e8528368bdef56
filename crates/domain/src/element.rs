//! Creature element types
//!
//! The closed set of types a generation request can be steered towards.
//! Labels are the French names the generation service understands.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Label meaning "no dominant type" in generation requests.
pub const NO_DOMINANT_TYPE: &str = "Aucun";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementType {
    Feu,
    Eau,
    Plante,
    Electrik,
    Psy,
    Tenebres,
    Acier,
    Roche,
    Sol,
    Insecte,
    Vol,
    Glace,
    Combat,
    Fee,
    Spectre,
    Dragon,
    Poison,
    Normal,
}

impl ElementType {
    pub fn all() -> &'static [ElementType] {
        &[
            ElementType::Feu,
            ElementType::Eau,
            ElementType::Plante,
            ElementType::Electrik,
            ElementType::Psy,
            ElementType::Tenebres,
            ElementType::Acier,
            ElementType::Roche,
            ElementType::Sol,
            ElementType::Insecte,
            ElementType::Vol,
            ElementType::Glace,
            ElementType::Combat,
            ElementType::Fee,
            ElementType::Spectre,
            ElementType::Dragon,
            ElementType::Poison,
            ElementType::Normal,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ElementType::Feu => "Feu",
            ElementType::Eau => "Eau",
            ElementType::Plante => "Plante",
            ElementType::Electrik => "Électrik",
            ElementType::Psy => "Psy",
            ElementType::Tenebres => "Ténèbres",
            ElementType::Acier => "Acier",
            ElementType::Roche => "Roche",
            ElementType::Sol => "Sol",
            ElementType::Insecte => "Insecte",
            ElementType::Vol => "Vol",
            ElementType::Glace => "Glace",
            ElementType::Combat => "Combat",
            ElementType::Fee => "Fée",
            ElementType::Spectre => "Spectre",
            ElementType::Dragon => "Dragon",
            ElementType::Poison => "Poison",
            ElementType::Normal => "Normal",
        }
    }

    /// Parse an optional dominant type; `"Aucun"` and blank mean none.
    pub fn parse_dominant(label: &str) -> Result<Option<Self>, ValidationError> {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_DOMINANT_TYPE) {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ElementType {
    type Err = ValidationError;

    /// Case-insensitive match on the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ElementType::all()
            .iter()
            .copied()
            .find(|element| element.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::UnknownElementType(s.to_string()))
    }
}

impl TryFrom<String> for ElementType {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ElementType> for String {
    fn from(element: ElementType) -> String {
        element.label().to_string()
    }
}
