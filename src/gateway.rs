use anyhow::Result;
use async_trait::async_trait;
use llmapi::gemini::{response_to_text_data, send_generate_request, GeminiResponse};
use llmapi::{GenerationConfig, LLMClient, LLMMessage, LLMMessageType};
use tracing::debug;

use crate::config::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Vision and text model used for descriptions, prompts and translation.
    Description,
    /// Model allowed to answer with image parts.
    ImageGeneration,
}

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, kind: ModelKind, messages: Vec<LLMMessage>)
        -> Result<GeminiResponse>;
}

#[derive(Clone)]
pub struct GeminiGateway {
    description: LLMClient,
    image: LLMClient,
}

impl GeminiGateway {
    pub fn new(http: reqwest::Client, settings: &Settings) -> Self {
        let description = LLMClient::with_http(
            http.clone(),
            settings.gemini_api_key.clone(),
            settings.gemini_endpoint.clone(),
            settings.description_model.clone(),
        )
        .with_generation_config(GenerationConfig::text_only());

        let image = LLMClient::with_http(
            http,
            settings.gemini_api_key.clone(),
            settings.gemini_endpoint.clone(),
            settings.image_model.clone(),
        )
        .with_generation_config(GenerationConfig::image_and_text());

        Self { description, image }
    }

    fn client(&self, kind: ModelKind) -> &LLMClient {
        match kind {
            ModelKind::Description => &self.description,
            ModelKind::ImageGeneration => &self.image,
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiGateway {
    async fn generate(
        &self,
        kind: ModelKind,
        messages: Vec<LLMMessage>,
    ) -> Result<GeminiResponse> {
        let client = self.client(kind);
        debug!(model = client.default_model(), turns = messages.len(), "calling gemini");
        send_generate_request(client, messages).await
    }
}

/// Multi-turn conversation with one model; earlier turns are replayed on
/// every call.
pub struct ChatSession<'a> {
    backend: &'a dyn GenerativeBackend,
    kind: ModelKind,
    history: Vec<LLMMessage>,
}

impl<'a> ChatSession<'a> {
    pub fn new(backend: &'a dyn GenerativeBackend, kind: ModelKind) -> Self {
        Self {
            backend,
            kind,
            history: Vec::new(),
        }
    }

    pub async fn send(&mut self, content: Vec<LLMMessageType>) -> Result<GeminiResponse> {
        self.history.push(LLMMessage::user(content));
        let response = self.backend.generate(self.kind, self.history.clone()).await?;
        let reply = response_to_text_data(&response).unwrap_or_default();
        self.history.push(LLMMessage::model(reply));
        Ok(response)
    }

    /// Sends the content and returns the reply text of the first candidate.
    pub async fn send_for_text(&mut self, content: Vec<LLMMessageType>) -> Result<String> {
        let response = self.send(content).await?;
        response_to_text_data(&response)
    }
}
