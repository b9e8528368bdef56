//! Battle terrain
//!
//! The battle context is a single label from a closed set. Each terrain
//! carries the element types it is conventionally said to favour. That
//! affinity is advisory: it is handed to the narrator as context and never
//! enforced here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::element::ElementType;
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Terrain {
    #[default]
    Volcan,
    Ocean,
    Espace,
    Foret,
    Desert,
    Glace,
    Montagne,
    Plaines,
    Caverne,
    Ville,
    Ruines,
    IleTropicale,
    ChampDeFleurs,
    Marais,
    Jungle,
    Savane,
    Toundra,
    TempleAncien,
    CoteRocheuse,
}

impl Terrain {
    /// Every terrain, in selector order.
    pub fn all() -> &'static [Terrain] {
        &[
            Terrain::Volcan,
            Terrain::Ocean,
            Terrain::Espace,
            Terrain::Foret,
            Terrain::Desert,
            Terrain::Glace,
            Terrain::Montagne,
            Terrain::Plaines,
            Terrain::Caverne,
            Terrain::Ville,
            Terrain::Ruines,
            Terrain::IleTropicale,
            Terrain::ChampDeFleurs,
            Terrain::Marais,
            Terrain::Jungle,
            Terrain::Savane,
            Terrain::Toundra,
            Terrain::TempleAncien,
            Terrain::CoteRocheuse,
        ]
    }

    /// The label shown to users and sent to the narrator.
    pub fn label(&self) -> &'static str {
        match self {
            Terrain::Volcan => "Volcan",
            Terrain::Ocean => "Océan",
            Terrain::Espace => "Espace",
            Terrain::Foret => "Forêt",
            Terrain::Desert => "Désert",
            Terrain::Glace => "Glace",
            Terrain::Montagne => "Montagne",
            Terrain::Plaines => "Plaines",
            Terrain::Caverne => "Caverne",
            Terrain::Ville => "Ville",
            Terrain::Ruines => "Ruines",
            Terrain::IleTropicale => "Île Tropicale",
            Terrain::ChampDeFleurs => "Champ de Fleurs",
            Terrain::Marais => "Marais",
            Terrain::Jungle => "Jungle",
            Terrain::Savane => "Savane",
            Terrain::Toundra => "Toundra",
            Terrain::TempleAncien => "Temple Ancien",
            Terrain::CoteRocheuse => "Côte Rocheuse",
        }
    }

    /// Element types this terrain conventionally favours.
    pub fn favoured_types(&self) -> &'static [ElementType] {
        use ElementType::*;
        match self {
            Terrain::Volcan => &[Feu, Roche, Sol],
            Terrain::Ocean => &[Eau, Vol],
            Terrain::Espace => &[Psy, Dragon, Spectre],
            Terrain::Foret => &[Plante, Insecte],
            Terrain::Desert => &[Sol, Roche, Feu],
            Terrain::Glace => &[Glace, Acier],
            Terrain::Montagne => &[Roche, Combat, Vol],
            Terrain::Plaines => &[Normal, Vol],
            Terrain::Caverne => &[Roche, Sol, Tenebres],
            Terrain::Ville => &[Electrik, Acier, Normal],
            Terrain::Ruines => &[Spectre, Psy],
            Terrain::IleTropicale => &[Eau, Plante],
            Terrain::ChampDeFleurs => &[Fee, Plante],
            Terrain::Marais => &[Poison, Eau],
            Terrain::Jungle => &[Plante, Insecte, Poison],
            Terrain::Savane => &[Normal, Sol],
            Terrain::Toundra => &[Glace],
            Terrain::TempleAncien => &[Psy, Spectre, Dragon],
            Terrain::CoteRocheuse => &[Roche, Eau],
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Terrain {
    type Err = ValidationError;

    /// Case-insensitive match on the label; accents are required.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Terrain::all()
            .iter()
            .copied()
            .find(|terrain| terrain.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::UnknownTerrain(s.to_string()))
    }
}

impl TryFrom<String> for Terrain {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Terrain> for String {
    fn from(terrain: Terrain) -> String {
        terrain.label().to_string()
    }
}
