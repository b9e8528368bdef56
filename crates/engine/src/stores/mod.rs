//! In-memory state storage modules.
//!
//! - `SessionStore` - the arena/lab session shared by all HTTP requests

pub mod session;

pub use session::SessionStore;
