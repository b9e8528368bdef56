//! Application state and composition.

use std::sync::Arc;

use pokearena_domain::BatchSize;

use crate::infrastructure::ports::LlmPort;
use crate::stores::SessionStore;
use crate::use_cases::{self, arena, lab};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
    pub session: SessionStore,
    /// Used when a batch request does not say how many creatures it wants.
    pub default_batch_size: BatchSize,
}

/// Container for all use cases.
pub struct UseCases {
    pub arena: use_cases::ArenaUseCases,
    pub lab: use_cases::LabUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(llm: Arc<dyn LlmPort>, default_batch_size: BatchSize) -> Self {
        let arena = use_cases::ArenaUseCases::new(
            Arc::new(arena::ValidateContenders::new()),
            Arc::new(arena::NarrateBattle::new(llm.clone())),
        );

        let lab = use_cases::LabUseCases::new(
            Arc::new(lab::GenerateBatch::new(llm.clone())),
            Arc::new(lab::RecommendCompanion::new(llm)),
        );

        Self {
            use_cases: UseCases { arena, lab },
            session: SessionStore::new(),
            default_batch_size,
        }
    }
}
