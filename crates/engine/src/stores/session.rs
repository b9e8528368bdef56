//! Session storage for runtime state.
//!
//! One `SessionState` per engine process. A workflow holds the lock for its
//! whole duration, LLM call included, so concurrent triggers are serialized and
//! never observe each other's partial writes.

use tokio::sync::{Mutex, MutexGuard};

use pokearena_domain::SessionState;

pub struct SessionStore {
    inner: Mutex<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionState::new()),
        }
    }

    /// Exclusive access for one workflow.
    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().await
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> SessionState {
        self.inner.lock().await.clone()
    }

    /// Drop everything the session accumulated.
    pub async fn reset(&self) {
        self.inner.lock().await.reset();
        tracing::info!("Session reset");
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
