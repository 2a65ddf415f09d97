use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine as _;
use llmapi::gemini::GeminiResponse;
use llmapi::{LLMMessage, LLMMessageType};
use serde_json::json;

use crate::gateway::{GenerativeBackend, ModelKind};
use crate::models::TempUpload;
use crate::storage::ImageStore;

pub(crate) fn text_response(text: &str) -> GeminiResponse {
    serde_json::from_value(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
    .expect("text response")
}

pub(crate) fn image_response(bytes: &[u8], mime_type: &str) -> GeminiResponse {
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    serde_json::from_value(json!({
        "candidates": [{ "content": { "role": "model", "parts": [
            { "text": "Here is your painting." },
            { "inlineData": { "mimeType": mime_type, "data": data } }
        ] } }]
    }))
    .expect("image response")
}

pub(crate) fn write_upload(dir: &Path, name: &str) -> TempUpload {
    let path = dir.join(name);
    std::fs::write(&path, [137, 80, 78, 71]).expect("write upload");
    TempUpload::new(path)
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub kind: ModelKind,
    pub messages: Vec<LLMMessage>,
}

impl RecordedCall {
    pub fn last_text(&self) -> String {
        self.messages.last().map(LLMMessage::text).unwrap_or_default()
    }

    pub fn has_image(&self) -> bool {
        self.messages.iter().any(|message| {
            message
                .content
                .iter()
                .any(|part| matches!(part, LLMMessageType::IMAGE { .. }))
        })
    }
}

/// Scripted backend: answers each model kind from its own queue and records
/// every request.
#[derive(Default)]
pub(crate) struct FakeBackend {
    description: Mutex<VecDeque<Result<GeminiResponse>>>,
    image: Mutex<VecDeque<Result<GeminiResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&mut self, kind: ModelKind) -> &mut VecDeque<Result<GeminiResponse>> {
        match kind {
            ModelKind::Description => self.description.get_mut().unwrap(),
            ModelKind::ImageGeneration => self.image.get_mut().unwrap(),
        }
    }

    pub fn reply(mut self, kind: ModelKind, response: GeminiResponse) -> Self {
        self.queue(kind).push_back(Ok(response));
        self
    }

    pub fn reply_text(self, text: &str) -> Self {
        self.reply(ModelKind::Description, text_response(text))
    }

    pub fn fail(mut self, kind: ModelKind, message: &str) -> Self {
        self.queue(kind).push_back(Err(anyhow!(message.to_string())));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, kind: ModelKind) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .collect()
    }
}

#[async_trait]
impl GenerativeBackend for FakeBackend {
    async fn generate(
        &self,
        kind: ModelKind,
        messages: Vec<LLMMessage>,
    ) -> Result<GeminiResponse> {
        self.calls.lock().unwrap().push(RecordedCall { kind, messages });
        let queue = match kind {
            ModelKind::Description => &self.description,
            ModelKind::ImageGeneration => &self.image,
        };
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("no scripted response for {kind:?}")))
    }
}

/// In-memory store that keeps every put.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub puts: Mutex<Vec<(String, Vec<u8>, String)>>,
    pub failing: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<(String, Vec<u8>, String)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn put(&self, file_name: &str, bytes: Vec<u8>, mime_type: &str) -> Result<String> {
        if self.failing {
            return Err(anyhow!("bucket unavailable"));
        }
        self.puts
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes, mime_type.to_string()));
        Ok(format!("memory://{file_name}"))
    }
}
