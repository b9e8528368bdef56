//! Use cases - User story orchestration.
//!
//! Each workflow takes the session state it reads or writes explicitly, and
//! writes to it only after every step succeeded.

pub mod arena;
pub mod lab;
pub mod response_parser;

pub use arena::ArenaUseCases;
pub use lab::LabUseCases;
