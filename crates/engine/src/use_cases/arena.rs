//! Arena use cases.
//!
//! - Validating the two contenders and the terrain of a battle
//! - Narrating the battle through the LLM and reading back the winner

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use pokearena_domain::{
    validate_pair, CharacterRecord, ContenderSide, SessionState, Terrain, ValidationError,
};

use crate::infrastructure::ports::{LlmError, LlmPort};
use crate::prompt_templates::{build_narration_prompt, VERDICT_SENTINEL};
use crate::use_cases::response_parser::{parse_verdict, ExtractionError};

/// Sampling temperature for narrations.
pub const NARRATION_TEMPERATURE: f32 = 0.8;

/// Container for arena use cases.
pub struct ArenaUseCases {
    pub validate_contenders: Arc<ValidateContenders>,
    pub narrate_battle: Arc<NarrateBattle>,
}

impl ArenaUseCases {
    pub fn new(validate_contenders: Arc<ValidateContenders>, narrate_battle: Arc<NarrateBattle>) -> Self {
        Self {
            validate_contenders,
            narrate_battle,
        }
    }
}

// =============================================================================
// Contender Validation
// =============================================================================

/// Both contenders normalized and committed to the session.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedContenders {
    pub champion: CharacterRecord,
    pub adversary: CharacterRecord,
    pub terrain: Terrain,
}

/// Per-side validation failures. At least one side is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContenderRejection {
    pub champion: Option<ValidationError>,
    pub adversary: Option<ValidationError>,
}

impl ContenderRejection {
    pub fn for_side(&self, side: ContenderSide) -> Option<&ValidationError> {
        match side {
            ContenderSide::Champion => self.champion.as_ref(),
            ContenderSide::Adversary => self.adversary.as_ref(),
        }
    }
}

impl fmt::Display for ContenderRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons = [ContenderSide::Champion, ContenderSide::Adversary]
            .into_iter()
            .filter_map(|side| self.for_side(side).map(|e| format!("{side}: {e}")))
            .collect::<Vec<_>>();
        f.write_str(&reasons.join("; "))
    }
}

impl std::error::Error for ContenderRejection {}

/// Normalizes both sides independently; the session only changes when both
/// records are valid.
#[derive(Debug, Default)]
pub struct ValidateContenders;

impl ValidateContenders {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        session: &mut SessionState,
        champion_raw: &str,
        adversary_raw: &str,
        terrain: Terrain,
    ) -> Result<ValidatedContenders, ContenderRejection> {
        match validate_pair(champion_raw, adversary_raw) {
            (Ok(champion), Ok(adversary)) => {
                tracing::info!(
                    champion = champion.name().unwrap_or_default(),
                    adversary = adversary.name().unwrap_or_default(),
                    terrain = terrain.label(),
                    "Contenders validated"
                );
                session.set_contenders(champion.clone(), adversary.clone(), terrain);
                Ok(ValidatedContenders {
                    champion,
                    adversary,
                    terrain,
                })
            }
            (champion, adversary) => {
                let rejection = ContenderRejection {
                    champion: champion.err(),
                    adversary: adversary.err(),
                };
                tracing::info!(reason = %rejection, "Contenders rejected");
                Err(rejection)
            }
        }
    }
}

// =============================================================================
// Battle Narration
// =============================================================================

/// Narration plus the winner read from its verdict line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub narration: String,
    pub verdict: Option<String>,
    /// Set when no single verdict could be read; the narration is still shown.
    pub warning: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("Champion, adversary and terrain must be validated first")]
    MissingContenders,
    #[error(transparent)]
    Service(#[from] LlmError),
}

pub struct NarrateBattle {
    llm: Arc<dyn LlmPort>,
}

impl NarrateBattle {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Narrate the session's current matchup. The session is only read.
    pub async fn execute(&self, session: &SessionState) -> Result<BattleReport, NarrationError> {
        let matchup = session.matchup().ok_or(NarrationError::MissingContenders)?;

        let request = build_narration_prompt(matchup.champion, matchup.adversary, matchup.terrain)
            .into_request()
            .with_temperature(NARRATION_TEMPERATURE);

        tracing::debug!(
            champion = matchup.champion.name().unwrap_or_default(),
            adversary = matchup.adversary.name().unwrap_or_default(),
            terrain = matchup.terrain.label(),
            "Requesting battle narration"
        );

        let response = self.llm.generate(request).await.map_err(|e| {
            tracing::error!(error = %e, "Battle narration failed");
            NarrationError::Service(e)
        })?;

        let narration = response.content;
        let (verdict, warning) = match parse_verdict(&narration) {
            Ok(winner) => (Some(winner), None),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read the battle verdict");
                (None, Some(verdict_warning(&e)))
            }
        };

        tracing::info!(verdict = ?verdict, "Battle narrated");

        Ok(BattleReport {
            narration,
            verdict,
            warning,
        })
    }
}

fn verdict_warning(error: &ExtractionError) -> String {
    match error {
        ExtractionError::ConflictingVerdicts(names) => format!(
            "La narration désigne plusieurs vainqueurs ({}).",
            names.join(", ")
        ),
        _ => format!(
            "Aucune ligne \"{} : <nom>\" trouvée dans la narration.",
            VERDICT_SENTINEL
        ),
    }
}
