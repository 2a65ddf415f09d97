use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// Anything other than `"ar"` falls back to English.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()) {
            Some(value) if value == "ar" => Language::Ar,
            _ => Language::En,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
        }
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Language::parse(raw.as_deref()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::En => f.write_str("en"),
            Language::Ar => f.write_str("ar"),
        }
    }
}

/// JSON body returned by every flow. Fields a flow does not produce are
/// left out of the response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToImageRequest {
    pub prompt: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionToArtRequest {
    pub description: Option<String>,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateImageRequest {
    pub prompt: Option<String>,
}

/// An uploaded image parked on local disk for the duration of one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempUpload {
    pub path: PathBuf,
}

impl TempUpload {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Everything a flow may receive from the caller.
#[derive(Debug, Clone, Default)]
pub struct FlowInput {
    pub image: Option<TempUpload>,
    pub text: Option<String>,
    pub instructions: Option<String>,
    pub language: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parsing_is_lenient() {
        assert_eq!(Language::parse(Some("ar")), Language::Ar);
        assert_eq!(Language::parse(Some(" AR ")), Language::Ar);
        assert_eq!(Language::parse(Some("fr")), Language::En);
        assert_eq!(Language::parse(None), Language::En);
    }

    #[test]
    fn language_deserializes_from_null_and_strings() {
        let request: TextToImageRequest =
            serde_json::from_str(r#"{"prompt":"x","language":null}"#).unwrap();
        assert_eq!(request.language, Language::En);
        let request: TextToImageRequest =
            serde_json::from_str(r#"{"prompt":"x","language":"ar"}"#).unwrap();
        assert_eq!(request.language, Language::Ar);
        let request: TextToImageRequest = serde_json::from_str(r#"{"prompt":"x"}"#).unwrap();
        assert_eq!(request.language, Language::En);
    }

    #[test]
    fn result_omits_absent_fields() {
        let result = GenerationResult {
            prompt: Some("p".into()),
            english_prompt: Some("p".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value, serde_json::json!({ "prompt": "p", "englishPrompt": "p" }));
    }
}
