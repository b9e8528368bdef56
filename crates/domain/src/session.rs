//! Session state
//!
//! Everything one user session accumulates across independent workflows:
//! the two contenders and their terrain, the last generated batch, and the
//! companion picked from it. Each workflow writes only its own fields, and
//! only after it has fully succeeded.

use serde::Serialize;
use std::fmt;

use crate::batch::GeneratedBatch;
use crate::error::LookupError;
use crate::record::CharacterRecord;
use crate::terrain::Terrain;

/// Which side of the arena a submitted record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContenderSide {
    Champion,
    Adversary,
}

impl fmt::Display for ContenderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContenderSide::Champion => f.write_str("champion"),
            ContenderSide::Adversary => f.write_str("adversary"),
        }
    }
}

/// The companion chosen from the current batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanionSelection {
    pub name: String,
    pub record: CharacterRecord,
}

/// Validated champion, adversary and terrain, borrowed from the session.
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub champion: &'a CharacterRecord,
    pub adversary: &'a CharacterRecord,
    pub terrain: Terrain,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    champion: Option<CharacterRecord>,
    adversary: Option<CharacterRecord>,
    terrain: Option<Terrain>,
    batch: Option<GeneratedBatch>,
    companion: Option<CompanionSelection>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn champion(&self) -> Option<&CharacterRecord> {
        self.champion.as_ref()
    }

    pub fn adversary(&self) -> Option<&CharacterRecord> {
        self.adversary.as_ref()
    }

    pub fn terrain(&self) -> Option<Terrain> {
        self.terrain
    }

    pub fn batch(&self) -> Option<&GeneratedBatch> {
        self.batch.as_ref()
    }

    pub fn companion(&self) -> Option<&CompanionSelection> {
        self.companion.as_ref()
    }

    /// Both contenders and the terrain, if a validated pair was committed.
    pub fn matchup(&self) -> Option<Matchup<'_>> {
        Some(Matchup {
            champion: self.champion.as_ref()?,
            adversary: self.adversary.as_ref()?,
            terrain: self.terrain?,
        })
    }

    /// Commit a validated pair. Both sides are written together.
    pub fn set_contenders(
        &mut self,
        champion: CharacterRecord,
        adversary: CharacterRecord,
        terrain: Terrain,
    ) {
        self.champion = Some(champion);
        self.adversary = Some(adversary);
        self.terrain = Some(terrain);
    }

    /// Replace the batch wholesale. The previous companion referenced the
    /// old batch, so it is dropped.
    pub fn replace_batch(&mut self, batch: GeneratedBatch) {
        self.batch = Some(batch);
        self.companion = None;
    }

    /// Resolve `chosen_name` in the current batch and remember it under the
    /// record's own spelling of the name.
    ///
    /// On failure the previous selection is kept.
    pub fn select_companion(
        &mut self,
        chosen_name: &str,
    ) -> Result<&CompanionSelection, LookupError> {
        let batch = self.batch.as_ref().ok_or(LookupError::NoBatch)?;
        let record = batch.resolve(chosen_name)?.clone();
        let name = record.name().unwrap_or(chosen_name).to_string();
        Ok(&*self.companion.insert(CompanionSelection { name, record }))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
