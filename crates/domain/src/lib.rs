//! PokéArena domain: records, terrain, generated batches and session state.
//!
//! Everything here is pure. Parsing and validation happen at construction,
//! so a `CharacterRecord` or `GeneratedBatch` in hand is already normalized.

pub mod batch;
pub mod element;
pub mod error;
pub mod record;
pub mod session;
pub mod terrain;

pub use batch::{BatchSize, GeneratedBatch, BATCH_KEY, NAME_COLUMNS};
pub use element::{ElementType, NO_DOMINANT_TYPE};
pub use error::{LookupError, ValidationError};
pub use record::{
    validate_pair, CharacterRecord, RecordSummary, NAME_ALIASES, NAME_KEY, TYPE_ALIASES, TYPE_KEY,
};
pub use session::{CompanionSelection, ContenderSide, Matchup, SessionState};
pub use terrain::Terrain;
