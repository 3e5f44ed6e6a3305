//! Language-model transport.
//!
//! `OllamaBackend` talks to a local Ollama server and is the default.
//! `AnthropicBackend` is compiled in with the `remote-ai` feature.

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
#[cfg(test)]
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
#[cfg(feature = "remote-ai")]
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::AgentError;
use crate::config::AiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One message of a conversation, as sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub tokens_used: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A chat-completion service.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Short identifier used in logs and the health endpoint.
    fn name(&self) -> &'static str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError>;

    /// `Ok(false)` when the service is reachable but not ready.
    async fn health_check(&self) -> Result<bool, AgentError>;
}

/// Shared HTTP plumbing: one client with a per-request timeout, and uniform
/// mapping of transport failures onto `AgentError`.
struct Transport {
    client: reqwest::Client,
    timeout_seconds: u64,
}

impl Transport {
    fn new(timeout_seconds: u64) -> Result<Self, AgentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| AgentError::BackendUnavailable(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            timeout_seconds,
        })
    }

    fn send_error(&self, e: reqwest::Error) -> AgentError {
        if e.is_timeout() {
            AgentError::Timeout(self.timeout_seconds)
        } else {
            AgentError::BackendUnavailable(e.to_string())
        }
    }

    async fn post_json<B, R>(
        &self,
        service: &str,
        url: &str,
        headers: HeaderMap,
        body: &B,
    ) -> Result<R, AgentError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {} ({})", url, service);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited(retry_after_secs(response.headers())));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::BackendUnavailable(format!(
                "{} answered {}: {}",
                service, status, detail
            )));
        }

        response.json::<R>().await.map_err(|e| {
            if e.is_timeout() {
                AgentError::Timeout(self.timeout_seconds)
            } else {
                AgentError::ResponseParseError(e.to_string())
            }
        })
    }
}

/// Seconds from a `retry-after` header; 1 when absent or not an integer.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(1)
}

/// `{role, content}` pair, the message shape both services accept.
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl From<ChatMessage> for WireMessage {
    fn from(m: ChatMessage) -> Self {
        Self {
            role: m.role.as_str(),
            content: m.content,
        }
    }
}

// --- Ollama ---

pub struct OllamaBackend {
    transport: Transport,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: String, model: String, timeout_seconds: u64) -> Result<Self, AgentError> {
        Ok(Self {
            transport: Transport::new(timeout_seconds)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn body(&self, request: ChatRequest) -> OllamaChatBody {
        OllamaChatBody {
            model: self.model.clone(),
            messages: request.messages.into_iter().map(WireMessage::from).collect(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatBody {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    model: String,
    message: OllamaReplyMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaReplyMessage {
    content: String,
}

impl From<OllamaReply> for ChatResponse {
    fn from(reply: OllamaReply) -> Self {
        let tokens_used = reply
            .prompt_eval_count
            .zip(reply.eval_count)
            .map(|(prompt, completion)| TokenUsage::new(prompt, completion));
        Self {
            content: reply.message.content,
            model: reply.model,
            tokens_used,
        }
    }
}

#[async_trait]
impl AiBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        let url = format!("{}/api/chat", self.base_url);
        let reply: OllamaReply = self
            .transport
            .post_json("Ollama", &url, HeaderMap::new(), &self.body(request))
            .await?;
        Ok(reply.into())
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.transport.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Ollama at {} is not reachable: {}", self.base_url, e);
                Ok(false)
            }
        }
    }
}

// --- Anthropic ---

#[cfg(feature = "remote-ai")]
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";

#[cfg(feature = "remote-ai")]
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[cfg(feature = "remote-ai")]
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[cfg(feature = "remote-ai")]
#[derive(Debug, Serialize)]
struct AnthropicBody {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct AnthropicReply {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[cfg(feature = "remote-ai")]
#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(feature = "remote-ai")]
impl From<AnthropicReply> for ChatResponse {
    fn from(reply: AnthropicReply) -> Self {
        Self {
            content: reply.content.into_iter().map(|b| b.text).collect(),
            model: reply.model,
            tokens_used: reply
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
        }
    }
}

#[cfg(feature = "remote-ai")]
pub struct AnthropicBackend {
    transport: Transport,
    model: String,
    api_key: HeaderValue,
}

#[cfg(feature = "remote-ai")]
impl AnthropicBackend {
    pub fn new(api_key: String, model: String, timeout_seconds: u64) -> Result<Self, AgentError> {
        let mut api_key = HeaderValue::from_str(api_key.trim()).map_err(|_| {
            AgentError::InvalidCredential("API key contains characters not allowed in a header".into())
        })?;
        api_key.set_sensitive(true);

        Ok(Self {
            transport: Transport::new(timeout_seconds)?,
            model,
            api_key,
        })
    }

    /// Build with the key taken from the environment variable `api_key_env`.
    pub fn from_env(api_key_env: &str, model: String, timeout_seconds: u64) -> Result<Self, AgentError> {
        match std::env::var(api_key_env) {
            Ok(key) if !key.trim().is_empty() => Self::new(key, model, timeout_seconds),
            _ => Err(AgentError::MissingCredential(api_key_env.to_string())),
        }
    }

    /// System messages are lifted into the top-level `system` field.
    fn body(&self, request: ChatRequest) -> AnthropicBody {
        let (system, turns): (Vec<ChatMessage>, Vec<ChatMessage>) = request
            .messages
            .into_iter()
            .partition(|m| m.role == MessageRole::System);

        let system = (!system.is_empty()).then(|| {
            system
                .into_iter()
                .map(|m| m.content)
                .collect::<Vec<_>>()
                .join("\n\n")
        });

        AnthropicBody {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages: turns.into_iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", self.api_key.clone());
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers
    }
}

#[cfg(feature = "remote-ai")]
#[async_trait]
impl AiBackend for AnthropicBackend {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        let headers = self.headers();
        let reply: AnthropicReply = self
            .transport
            .post_json("Anthropic", ANTHROPIC_URL, headers, &self.body(request))
            .await?;
        Ok(reply.into())
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        // No status endpoint; a configured key is the best signal available
        Ok(!self.api_key.is_empty())
    }
}

/// Build the backend selected by `config.backend`.
pub fn create_backend(config: &AiConfig) -> Result<Arc<dyn AiBackend>, AgentError> {
    let backend: Arc<dyn AiBackend> = match config.backend.as_str() {
        "ollama" => Arc::new(OllamaBackend::new(
            config.base_url.clone(),
            config.model.clone(),
            config.timeout_seconds,
        )?),
        #[cfg(feature = "remote-ai")]
        "anthropic" => Arc::new(AnthropicBackend::from_env(
            &config.api_key_env,
            config.model.clone(),
            config.timeout_seconds,
        )?),
        #[cfg(not(feature = "remote-ai"))]
        "anthropic" => {
            return Err(AgentError::BackendUnavailable(
                "anthropic backend needs the remote-ai feature".to_string(),
            ))
        }
        other => {
            return Err(AgentError::BackendUnavailable(format!(
                "unknown AI backend '{}'",
                other
            )))
        }
    };

    info!("Assistant backend: {} (model {})", backend.name(), config.model);
    Ok(backend)
}

/// Answers every request with the same text and keeps a copy of each request.
#[cfg(test)]
pub struct MockBackend {
    reply: String,
    seen: Mutex<Vec<ChatRequest>>,
}

#[cfg(test)]
impl MockBackend {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        match self.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl AiBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(request);
        }
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "mock".to_string(),
            tokens_used: None,
        })
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(true)
    }
}

/// Fails every request with a fixed error and counts attempts.
#[cfg(test)]
pub struct FailingBackend {
    error: AgentError,
    calls: AtomicUsize,
}

#[cfg(test)]
impl FailingBackend {
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

#[cfg(test)]
#[async_trait]
impl AiBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }

    async fn health_check(&self) -> Result<bool, AgentError> {
        Ok(false)
    }
}
