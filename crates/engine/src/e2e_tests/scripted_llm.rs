//! Scripted LLM for E2E tests.
//!
//! Replies are replayed in order; every request is kept for later assertions.
//! Running out of replies is an error, not a panic, so a test that makes one
//! call too many fails on its own assertion.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use pokearena_domain::BatchSize;

use crate::app::App;
use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, content: &str) -> Self {
        self.push(Ok(LlmResponse::text(content)))
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<LlmResponse, LlmError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::RequestFailed("no scripted reply left".to_string())))
    }
}

/// App wired to `llm`, plus the handle used to inspect its requests.
pub fn scripted_app(llm: ScriptedLlm) -> (Arc<App>, Arc<ScriptedLlm>) {
    let llm = Arc::new(llm);
    let app = Arc::new(App::new(llm.clone(), BatchSize::default()));
    (app, llm)
}
