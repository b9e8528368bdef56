//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod groq;
pub mod ports;
pub mod settings;
