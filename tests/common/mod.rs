//! Backends shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use pingpong_catalog::agents::backend::{AiBackend, ChatRequest, ChatResponse};
use pingpong_catalog::agents::AgentError;

/// Answers with a fixed reply and keeps every request.
pub struct CannedBackend {
    reply: String,
    seen: Mutex<Vec<ChatRequest>>,
}

impl CannedBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiBackend for CannedBackend {
    fn name(&self) -> &'static str {
        "canned"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        self.seen.lock().unwrap().push(request);
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "canned".to_string(),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(true)
    }
}

/// Fails every call with the same error.
pub struct DownBackend {
    error: AgentError,
    calls: AtomicUsize,
}

impl DownBackend {
    pub fn new(error: AgentError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiBackend for DownBackend {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(false)
    }
}
