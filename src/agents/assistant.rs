//! Assistant Agent.
//!
//! Answers free-form questions about the catalog. The whole catalog is
//! flattened into a system message so the model can reason over it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::backend::{AiBackend, ChatMessage, ChatRequest};
use super::{Agent, AgentError, RetryPolicy};
use crate::catalog::Catalog;

const CONTEXT_HEADER: &str = "You are the assistant of a school ping-pong player catalog. \
Answer questions using only the data below. Stats range from 0 to 10.";

/// Flatten the catalog into a plain-text context block.
///
/// One line per player across every group, then one line per skill.
/// Skill names on a player that do not resolve in the catalog are left out.
pub fn build_catalog_context(catalog: &Catalog) -> String {
    let mut lines = vec![CONTEXT_HEADER.to_string(), String::new(), "Players:".to_string()];

    for (group, player) in catalog.players() {
        let skills: Vec<&str> = player
            .skills
            .iter()
            .filter_map(|name| catalog.skill(name))
            .map(|s| s.name.as_str())
            .collect();
        let skills = if skills.is_empty() {
            "none".to_string()
        } else {
            skills.join(", ")
        };

        let s = &player.stats;
        lines.push(format!(
            "- {} ({}): {}. Attack {}, Defense {}, Serve {}, Spin {}, Game Vision {}. Style: {}. Skills: {}",
            player.name,
            group.title,
            player.description,
            s.attack,
            s.defense,
            s.serve,
            s.spin,
            s.vision,
            player.style,
            skills
        ));
    }

    lines.push(String::new());
    lines.push("Skills:".to_string());
    for skill in catalog.skills() {
        let rank = skill
            .rank
            .map(|r| r.as_str().to_string())
            .unwrap_or_else(|| "unranked".to_string());
        lines.push(format!("- {} (rank {}): {}", skill.name, rank, skill.description));
    }

    lines.join("\n")
}

/// One turn sent to the model: context, prior conversation, new question.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub context: String,
    pub history: Vec<ChatMessage>,
    pub message: String,
}

impl AssistantRequest {
    pub fn new(context: impl Into<String>, history: Vec<ChatMessage>, message: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            history,
            message: message.into(),
        }
    }

    /// `[system(context), history..., user(message)]`
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(ChatMessage::system(self.context));
        messages.extend(self.history);
        messages.push(ChatMessage::user(self.message));
        messages
    }
}

/// Assistant agent implementation.
pub struct AssistantAgent {
    backend: Arc<dyn AiBackend>,
    retry: RetryPolicy,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AssistantAgent {
    pub fn new(backend: Arc<dyn AiBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            temperature: 0.7,
            max_tokens: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cap the length of each reply.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        let request = ChatRequest::new(messages).with_temperature(self.temperature);
        match self.max_tokens {
            Some(n) => request.with_max_tokens(n),
            None => request,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn health_check(&self) -> Result<bool, AgentError> {
        self.backend.health_check().await
    }
}

#[async_trait]
impl Agent for AssistantAgent {
    type Input = AssistantRequest;
    type Output = String;

    fn name(&self) -> &'static str {
        "AssistantAgent"
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, AgentError> {
        let messages = input.into_messages();
        debug!(
            "Asking {} with {} messages",
            self.backend.name(),
            messages.len()
        );

        let response = self
            .retry
            .run(self.name(), || self.backend.chat(self.request(messages.clone())))
            .await?;

        info!(
            "{} answered via {} ({} chars)",
            self.name(),
            response.model,
            response.content.len()
        );
        Ok(response.content)
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone()
    }
}
