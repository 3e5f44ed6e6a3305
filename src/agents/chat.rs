//! Assistant chat sessions.
//!
//! A session owns an append-only transcript and allows one request in
//! flight at a time. Sending is split into `begin` and `complete` so callers
//! holding the session behind a lock can release it while the backend call
//! is outstanding. Over HTTP the backend call runs on its own task, so a
//! dropped request still records its reply and frees the session.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use super::assistant::{build_catalog_context, AssistantAgent, AssistantRequest};
use super::backend::{ChatMessage, MessageRole};
use super::{Agent, AgentError};
use crate::catalog::Catalog;

/// Shown in place of a reply when the backend call fails.
pub const FALLBACK_REPLY: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("A reply is already pending for this session")]
    Busy,

    #[error("Unknown chat session: {0}")]
    UnknownSession(Uuid),

    #[error("Assistant task failed: {0}")]
    TaskFailed(String),
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
    pub at: DateTime<Utc>,
    /// Set when the backend failed and `FALLBACK_REPLY` stands in for a reply
    pub fallback: bool,
}

impl ChatTurn {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
            fallback: false,
        }
    }

    fn fallback() -> Self {
        Self {
            fallback: true,
            ..Self::new(MessageRole::Assistant, FALLBACK_REPLY)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    transcript: Vec<ChatTurn>,
    in_flight: bool,
    #[serde(skip)]
    catalog: Arc<Catalog>,
    #[serde(skip)]
    context: Option<String>,
}

impl ChatSession {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            transcript: Vec::new(),
            in_flight: false,
            catalog,
            context: None,
        }
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Input is accepted only while no reply is pending.
    pub fn is_input_enabled(&self) -> bool {
        !self.in_flight
    }

    fn context(&mut self) -> String {
        let catalog = &self.catalog;
        self.context
            .get_or_insert_with(|| build_catalog_context(catalog))
            .clone()
    }

    /// Record the user's message and build the request for it.
    ///
    /// Blank messages are rejected without touching the transcript.
    pub fn begin(&mut self, message: &str) -> Result<AssistantRequest, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.in_flight {
            return Err(ChatError::Busy);
        }

        let history = self
            .transcript
            .iter()
            .map(|t| ChatMessage {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();
        let context = self.context();

        self.transcript.push(ChatTurn::new(MessageRole::User, message));
        self.in_flight = true;
        debug!("Session {}: sending turn {}", self.id, self.transcript.len());

        Ok(AssistantRequest::new(context, history, message))
    }

    /// Record the outcome of the request started by `begin`.
    pub fn complete(&mut self, result: Result<String, AgentError>) -> &ChatTurn {
        let turn = match result {
            Ok(reply) => ChatTurn::new(MessageRole::Assistant, reply),
            Err(e) => {
                warn!("Session {}: assistant failed: {}", self.id, e);
                ChatTurn::fallback()
            }
        };
        self.in_flight = false;
        self.transcript.push(turn);
        &self.transcript[self.transcript.len() - 1]
    }

    /// `begin`, ask the agent, then `complete`.
    pub async fn send(&mut self, message: &str, agent: &AssistantAgent) -> Result<ChatTurn, ChatError> {
        let request = self.begin(message)?;
        let result = agent.execute(request).await;
        Ok(self.complete(result).clone())
    }
}

/// In-memory session registry shared by HTTP handlers.
#[derive(Clone)]
pub struct ChatSessions {
    catalog: Arc<Catalog>,
    sessions: Arc<RwLock<HashMap<Uuid, ChatSession>>>,
}

impl ChatSessions {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn create(&self) -> ChatSession {
        let session = ChatSession::new(self.catalog.clone());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        debug!("Created chat session {}", session.id);
        session
    }

    /// Snapshot of a session.
    pub async fn get(&self, id: Uuid) -> Result<ChatSession, ChatError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(ChatError::UnknownSession(id))
    }

    /// Forget a session. A reply still pending for it is discarded.
    pub async fn remove(&self, id: Uuid) -> Result<ChatSession, ChatError> {
        let removed = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or(ChatError::UnknownSession(id))?;
        debug!("Removed chat session {}", id);
        Ok(removed)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub async fn begin(&self, id: Uuid, message: &str) -> Result<AssistantRequest, ChatError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(ChatError::UnknownSession(id))?;
        session.begin(message)
    }

    pub async fn complete(
        &self,
        id: Uuid,
        result: Result<String, AgentError>,
    ) -> Result<ChatTurn, ChatError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(ChatError::UnknownSession(id))?;
        Ok(session.complete(result).clone())
    }

    /// Send a message on a session.
    ///
    /// The agent call and the matching `complete` run on a spawned task that
    /// outlives the caller, so the session never stays in flight when the
    /// caller goes away. The registry lock is released while the agent runs;
    /// a concurrent send on the same session gets `Busy`.
    pub async fn send(
        &self,
        id: Uuid,
        message: &str,
        agent: Arc<AssistantAgent>,
    ) -> Result<ChatTurn, ChatError> {
        let request = self.begin(id, message).await?;

        let sessions = self.clone();
        let handle = tokio::spawn(async move {
            let result = agent.execute(request).await;
            sessions.complete(id, result).await
        });

        match handle.await {
            Ok(turn) => turn,
            Err(e) => {
                // The task died before completing; release the session
                let _ = self
                    .complete(id, Err(AgentError::BackendUnavailable(e.to_string())))
                    .await;
                Err(ChatError::TaskFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::backend::{
        AiBackend, ChatRequest, ChatResponse, FailingBackend, MockBackend,
    };
    use crate::agents::RetryPolicy;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Replies after a fixed delay.
    struct DelayedBackend {
        delay: Duration,
        reply: String,
    }

    #[async_trait]
    impl AiBackend for DelayedBackend {
        fn name(&self) -> &'static str {
            "delayed"
        }

        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse, AgentError> {
            tokio::time::sleep(self.delay).await;
            Ok(ChatResponse {
                content: self.reply.clone(),
                model: "delayed".to_string(),
                tokens_used: None,
            })
        }

        async fn health_check(&self) -> Result<bool, AgentError> {
            Ok(true)
        }
    }

    fn catalog() -> Arc<Catalog> {
        Arc::new(Catalog::builtin())
    }

    fn mock_agent(reply: &str) -> (Arc<MockBackend>, AssistantAgent) {
        let backend = Arc::new(MockBackend::new(reply));
        let agent = AssistantAgent::new(backend.clone());
        (backend, agent)
    }

    fn failing_agent() -> (Arc<FailingBackend>, AssistantAgent) {
        let backend = Arc::new(FailingBackend::new(AgentError::BackendUnavailable(
            "connection refused".into(),
        )));
        let agent = AssistantAgent::new(backend.clone()).with_retry_policy(RetryPolicy::none());
        (backend, agent)
    }

    #[tokio::test]
    async fn test_empty_message_is_noop() {
        let (backend, agent) = mock_agent("hi");
        let mut session = ChatSession::new(catalog());

        assert_eq!(session.send("", &agent).await, Err(ChatError::EmptyMessage));
        assert_eq!(session.send("   \n\t", &agent).await, Err(ChatError::EmptyMessage));

        assert!(session.transcript().is_empty());
        assert!(session.is_input_enabled());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_user_then_reply() {
        let (backend, agent) = mock_agent("Nicollas has the highest average.");
        let mut session = ChatSession::new(catalog());

        let turn = session.send("Who is the best?", &agent).await.unwrap();
        assert_eq!(turn.role, MessageRole::Assistant);
        assert_eq!(turn.content, "Nicollas has the highest average.");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, MessageRole::User);
        assert_eq!(transcript[0].content, "Who is the best?");
        assert!(transcript[0].at <= transcript[1].at);

        let requests = backend.requests();
        assert_eq!(requests[0].messages[0].role, MessageRole::System);
        assert!(requests[0].messages[0].content.contains("Dutra"));
    }

    #[tokio::test]
    async fn test_history_is_forwarded() {
        let (backend, agent) = mock_agent("ok");
        let mut session = ChatSession::new(catalog());

        session.send("first", &agent).await.unwrap();
        session.send("second", &agent).await.unwrap();

        let requests = backend.requests();
        let last = &requests[1].messages;
        let contents: Vec<&str> = last.iter().skip(1).map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "ok", "second"]);
    }

    #[tokio::test]
    async fn test_failure_appends_single_fallback() {
        let (backend, agent) = failing_agent();
        let mut session = ChatSession::new(catalog());

        let turn = session.send("Hello?", &agent).await.unwrap();
        assert_eq!(turn.content, FALLBACK_REPLY);
        assert!(turn.fallback);
        assert_eq!(backend.calls(), 1);

        let assistant_turns = session
            .transcript()
            .iter()
            .filter(|t| t.role == MessageRole::Assistant)
            .count();
        assert_eq!(assistant_turns, 1);
        assert!(session.is_input_enabled());

        // The conversation stays usable
        let turn = session.send("Still there?", &agent).await.unwrap();
        assert_eq!(turn.content, FALLBACK_REPLY);
        assert_eq!(session.transcript().len(), 4);
    }

    #[tokio::test]
    async fn test_reply_matching_fallback_text_is_not_flagged() {
        let (_, agent) = mock_agent(FALLBACK_REPLY);
        let mut session = ChatSession::new(catalog());

        let turn = session.send("Say the line", &agent).await.unwrap();
        assert_eq!(turn.content, FALLBACK_REPLY);
        assert!(!turn.fallback);
    }

    #[test]
    fn test_busy_while_in_flight() {
        let mut session = ChatSession::new(catalog());

        session.begin("one").unwrap();
        assert!(!session.is_input_enabled());
        assert_eq!(session.begin("two").unwrap_err(), ChatError::Busy);
        assert_eq!(session.transcript().len(), 1);

        session.complete(Ok("answer".into()));
        assert!(session.is_input_enabled());
        assert!(session.begin("two").is_ok());
    }

    #[test]
    fn test_context_built_once() {
        let mut session = ChatSession::new(catalog());
        assert!(session.context.is_none());

        let request = session.begin("hi").unwrap();
        assert!(session.context.is_some());
        session.complete(Ok("hello".into()));

        let again = session.begin("again").unwrap();
        assert_eq!(request.context, again.context);
    }

    #[test]
    fn test_message_is_trimmed() {
        let mut session = ChatSession::new(catalog());
        let request = session.begin("  spin?  ").unwrap();
        assert_eq!(request.message, "spin?");
        assert_eq!(session.transcript()[0].content, "spin?");
    }

    #[tokio::test]
    async fn test_registry_roundtrip() {
        let sessions = ChatSessions::new(catalog());
        let (_, agent) = mock_agent("pong");

        let session = sessions.create().await;
        assert_eq!(sessions.len().await, 1);

        sessions.send(session.id, "ping", Arc::new(agent)).await.unwrap();
        let snapshot = sessions.get(session.id).await.unwrap();
        assert_eq!(snapshot.transcript().len(), 2);
        assert!(!snapshot.in_flight());
    }

    #[tokio::test]
    async fn test_registry_unknown_session() {
        let sessions = ChatSessions::new(catalog());
        let (_, agent) = mock_agent("pong");
        let id = Uuid::new_v4();

        assert_eq!(sessions.get(id).await.unwrap_err(), ChatError::UnknownSession(id));
        assert_eq!(
            sessions.send(id, "ping", Arc::new(agent)).await.unwrap_err(),
            ChatError::UnknownSession(id)
        );
        assert_eq!(sessions.remove(id).await.unwrap_err(), ChatError::UnknownSession(id));
    }

    #[tokio::test]
    async fn test_registry_remove() {
        let sessions = ChatSessions::new(catalog());
        let kept = sessions.create().await;
        let dropped = sessions.create().await;

        let removed = sessions.remove(dropped.id).await.unwrap();
        assert_eq!(removed.id, dropped.id);
        assert_eq!(sessions.len().await, 1);
        assert!(sessions.get(kept.id).await.is_ok());
        assert_eq!(
            sessions.get(dropped.id).await.unwrap_err(),
            ChatError::UnknownSession(dropped.id)
        );
    }

    #[tokio::test]
    async fn test_abandoned_send_still_completes() {
        let sessions = ChatSessions::new(catalog());
        let id = sessions.create().await.id;
        let slow = Arc::new(AssistantAgent::new(Arc::new(DelayedBackend {
            delay: Duration::from_millis(100),
            reply: "late answer".to_string(),
        })));

        // The caller gives up long before the backend answers
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), sessions.send(id, "hi", slow)).await;
        assert!(abandoned.is_err());
        assert!(sessions.get(id).await.unwrap().in_flight());

        let settled = tokio::time::timeout(Duration::from_secs(5), async {
            while sessions.get(id).await.unwrap().in_flight() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(settled.is_ok(), "session stayed in flight");

        let snapshot = sessions.get(id).await.unwrap();
        let contents: Vec<&str> = snapshot.transcript().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["hi", "late answer"]);

        let (_, agent) = mock_agent("again");
        let turn = sessions.send(id, "again", Arc::new(agent)).await.unwrap();
        assert_eq!(turn.content, "again");
        assert_eq!(sessions.get(id).await.unwrap().transcript().len(), 4);
    }
}
