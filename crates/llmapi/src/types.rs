use crate::utils;
use serde::Serialize;

#[derive(Clone, Debug)]
pub enum LLMMessageType {
    TEXT(String),
    IMAGE {
        data_b64: String,
        file_path: Option<String>,
    },
}
impl LLMMessageType {
    pub fn text(text: impl Into<String>) -> Self {
        LLMMessageType::TEXT(text.into())
    }
    /// Inline image built from raw bytes. The mime type sent upstream is
    /// guessed from `file_path`.
    pub fn image_bytes(bytes: &[u8], file_path: impl Into<String>) -> Self {
        LLMMessageType::IMAGE {
            data_b64: utils::encode_byte_to_base64(bytes),
            file_path: Some(file_path.into()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            LLMMessageType::TEXT(text) => Some(text),
            LLMMessageType::IMAGE { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LLMUserType {
    Human,
    AI,
}

#[derive(Clone, Debug)]
pub struct LLMMessage {
    pub role: LLMUserType,
    pub content: Vec<LLMMessageType>,
}

impl LLMMessage {
    pub fn new(role: LLMUserType, content: Vec<LLMMessageType>) -> Self {
        Self { role, content }
    }

    pub fn user(content: Vec<LLMMessageType>) -> Self {
        Self::new(LLMUserType::Human, content)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(LLMUserType::AI, vec![LLMMessageType::text(text)])
    }

    /// Concatenated text parts, images skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(LLMMessageType::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Sampling and output settings sent as `generationConfig`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_modalities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
}

impl GenerationConfig {
    pub fn text_only() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_modalities: vec!["TEXT".into()],
            response_mime_type: Some("text/plain".into()),
        }
    }

    pub fn image_and_text() -> Self {
        Self {
            response_modalities: vec!["IMAGE".into(), "TEXT".into()],
            response_mime_type: None,
            ..Self::text_only()
        }
    }
}

#[derive(Clone)]
pub struct LLMClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
    pub(crate) default_model: String,
    pub(crate) generation_config: Option<GenerationConfig>,
}

impl LLMClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self::with_http(
            reqwest::Client::new(),
            api_key,
            endpoint,
            default_model,
        )
    }

    /// Builds a client that reuses an existing connection pool.
    pub fn with_http(
        http: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        let default_model = default_model.into();
        let default_model = default_model
            .strip_prefix("models/")
            .unwrap_or(&default_model)
            .to_string();
        Self {
            http,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model,
            generation_config: None,
        }
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn generation_config(&self) -> Option<&GenerationConfig> {
        self.generation_config.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_strips_models_prefix() {
        let client = LLMClient::new("key", "http://localhost/v1beta/models", "models/gemini-x");
        assert_eq!(client.default_model(), "gemini-x");
    }

    #[test]
    fn message_text_skips_images() {
        let message = LLMMessage::user(vec![
            LLMMessageType::image_bytes(&[1, 2, 3], "photo.png"),
            LLMMessageType::text("describe "),
            LLMMessageType::text("this"),
        ]);
        assert_eq!(message.role, LLMUserType::Human);
        assert_eq!(message.text(), "describe this");
        assert_eq!(LLMMessage::model("ok").role, LLMUserType::AI);
    }

    #[test]
    fn image_config_serializes_both_modalities() {
        let value = serde_json::to_value(GenerationConfig::image_and_text()).unwrap();
        assert_eq!(value["responseModalities"], serde_json::json!(["IMAGE", "TEXT"]));
        assert_eq!(value["topK"], 40);
        assert!(value.get("responseMimeType").is_none());
    }
}
