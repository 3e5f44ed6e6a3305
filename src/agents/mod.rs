//! AI-powered assistant.
//!
//! The assistant answers questions about the catalog by forwarding the
//! conversation to a language-model backend with the catalog injected as
//! context. Agents implement the `Agent` trait; transport lives in
//! `backend`.

pub mod assistant;
pub mod backend;
pub mod chat;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during agent execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("AI backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("AI response unparseable: {0}")]
    ResponseParseError(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),
}

impl AgentError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AgentError::BackendUnavailable(_) | AgentError::Timeout(_) | AgentError::RateLimited(_)
        )
    }
}

/// Retry policy for agents.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 500,
            backoff_multiplier: 2.0,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry number `attempt` (0-based). A rate-limit hint
    /// from the backend raises the delay, capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32, error: &AgentError) -> Duration {
        let backoff =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let hinted = match error {
            AgentError::RateLimited(secs) => secs.saturating_mul(1000) as f64,
            _ => 0.0,
        };
        let ms = backoff.max(hinted).min(self.max_delay_ms as f64);
        Duration::from_millis(ms as u64)
    }

    /// Run `op`, retrying transient failures with exponential backoff.
    pub async fn run<T, F, Fut>(&self, name: &str, mut op: F) -> Result<T, AgentError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                        name,
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Core trait for all AI agents.
#[async_trait]
pub trait Agent {
    type Input;
    type Output;

    /// Agent identifier for logging.
    fn name(&self) -> &'static str;

    /// Execute the agent's task.
    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError>;

    /// Retry policy for this agent.
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
    }
}
