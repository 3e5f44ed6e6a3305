use std::sync::Arc;

use crate::agents::assistant::AssistantAgent;
use crate::agents::backend::AiBackend;
use crate::agents::chat::ChatSessions;
use crate::catalog::Catalog;
use crate::radar::RadarGeometry;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub geometry: RadarGeometry,
    pub assistant: Arc<AssistantAgent>,
    pub chat_sessions: ChatSessions,
    pub cors_origin: String,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, geometry: RadarGeometry, backend: Arc<dyn AiBackend>) -> Self {
        Self::with_assistant(catalog, geometry, AssistantAgent::new(backend))
    }

    pub fn with_assistant(
        catalog: Arc<Catalog>,
        geometry: RadarGeometry,
        assistant: AssistantAgent,
    ) -> Self {
        Self {
            chat_sessions: ChatSessions::new(catalog.clone()),
            catalog,
            geometry,
            assistant: Arc::new(assistant),
            cors_origin: "*".to_string(),
        }
    }

    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origin = origin.into();
        self
    }
}
