//! End-to-end workflow tests.
//!
//! These drive complete `App` instances (use cases, session store and, where
//! relevant, the HTTP router) against a scripted LLM that replays canned
//! replies and records every request it received.
//!
//! ```bash
//! cargo test -p pokearena-engine --lib e2e_tests
//! ```

mod scripted_llm;

pub use scripted_llm::*;
