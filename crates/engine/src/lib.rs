//! PokéArena Engine library.
//!
//! Everything that talks to the LLM or holds session state.
//!
//! ## Structure
//!
//! - `prompt_templates` - Prompt pairs and the reply contracts they declare
//! - `use_cases/` - Arena and lab workflows, LLM reply parsing
//! - `stores/` - In-memory session state
//! - `infrastructure/` - LLM port, Groq adapter, settings
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod prompt_templates;
pub mod stores;
pub mod use_cases;

/// End-to-end workflow tests against a scripted LLM.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
