use anyhow::{Context, Result, anyhow};
use base64::Engine as _;
use serde_json::{Value, json};

use crate::types::{LLMClient, LLMMessage, LLMMessageType, LLMUserType};
use crate::utils::detect_mime_type;

use super::models::{GeminiResponse, InlineData, InlineImage, ModelInfo, ModelList};

pub fn convert_body_parts_gemini(body_part: Vec<LLMMessageType>) -> Vec<Value> {
    body_part
        .into_iter()
        .map(|part| match part {
            LLMMessageType::TEXT(text) => json!({ "text": text }),
            LLMMessageType::IMAGE {
                data_b64,
                file_path,
            } => {
                let mime = file_path
                    .as_ref()
                    .map(detect_mime_type)
                    .unwrap_or_else(|| "image/jpeg".into());
                json!({
                    "inlineData": {
                        "mimeType": mime,
                        "data": data_b64
                    }
                })
            }
        })
        .collect()
}
pub fn convert_messages_to_gemini_contents(messages: Vec<LLMMessage>) -> Vec<Value> {
    messages
        .into_iter()
        .map(|m| {
            let role = role_to_str(m.role);
            let parts = convert_body_parts_gemini(m.content);
            json!({
                "role": role,
                "parts": parts
            })
        })
        .collect()
}
fn role_to_str(role: LLMUserType) -> &'static str {
    match role {
        LLMUserType::Human => "user",
        LLMUserType::AI => "model",
    }
}

pub fn build_generate_body(api_client: &LLMClient, messages: Vec<LLMMessage>) -> Value {
    let mut body = json!({
        "contents": convert_messages_to_gemini_contents(messages)
    });
    if let Some(config) = api_client.generation_config() {
        body["generationConfig"] = json!(config);
    }
    body
}

pub async fn send_generate_request(
    api_client: &LLMClient,
    messages: Vec<LLMMessage>,
) -> Result<GeminiResponse> {
    let endpoint = api_client.endpoint().trim_end_matches('/');
    let url = format!(
        "{}/{}:generateContent",
        endpoint,
        api_client.default_model()
    );

    let body = build_generate_body(api_client, messages);

    let response = api_client
        .http
        .post(url)
        .header("x-goog-api-key", api_client.api_key())
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .context("Reading response body failed")?;

    if !status.is_success() {
        return Err(anyhow!(
            "Gemini generateContent failed: status {} body {}",
            status,
            response_text
        ));
    }

    let response: GeminiResponse = serde_json::from_str(&response_text).with_context(|| {
        format!(
            "Failed to decode Gemini response JSON. Raw response: {}",
            response_text
        )
    })?;

    Ok(response)
}

fn decode_inline_data(inline_data: &InlineData) -> Result<Vec<u8>> {
    let decoded_data = base64::engine::general_purpose::STANDARD
        .decode(inline_data.data.trim())
        .context("Base64 decoding failed")?;
    Ok(decoded_data)
}

/// First inline part across all candidates whose mime type is `image/*`.
///
/// Returns `Ok(None)` when the response carries no image part at all. An
/// image part with an empty payload is returned as-is so callers can decide
/// how to treat it.
pub fn first_inline_image(response: &GeminiResponse) -> Result<Option<InlineImage>> {
    let found = response
        .candidates
        .iter()
        .flat_map(|candidate| candidate.content.parts.iter())
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline_data| inline_data.mime_type.trim().starts_with("image/"));

    match found {
        Some(inline_data) => Ok(Some(InlineImage {
            mime_type: inline_data.mime_type.trim().to_string(),
            bytes: decode_inline_data(inline_data)?,
        })),
        None => Ok(None),
    }
}

pub fn response_to_text_data(response: &GeminiResponse) -> Result<String> {
    //get only 1 text response
    if let Some(candidate) = response.candidates.first() {
        let mut full_text = String::new();
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                full_text.push_str(text);
            }
        }
        Ok(full_text)
    } else {
        Err(anyhow!("No candidates found"))
    }
}

/// Every model visible to the API key, following pagination.
pub async fn list_models(api_client: &LLMClient) -> Result<Vec<ModelInfo>> {
    let url = api_client.endpoint().trim_end_matches('/').to_string();
    let mut models = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut request = api_client
            .http
            .get(&url)
            .header("x-goog-api-key", api_client.api_key());
        if let Some(token) = &page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let page: ModelList = request
            .send()
            .await
            .context("HTTP request (models.list) failed")?
            .error_for_status()
            .context("Non-success status returned from models.list")?
            .json()
            .await
            .context("Failed to decode models.list JSON")?;

        models.extend(page.models);
        match page.next_page_token.filter(|token| !token.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationConfig;

    fn parse(raw: Value) -> GeminiResponse {
        serde_json::from_value(raw).expect("valid response")
    }

    #[test]
    fn body_carries_inline_image_and_generation_config() {
        let client = LLMClient::new("k", "http://localhost/models", "m")
            .with_generation_config(GenerationConfig::text_only());
        let body = build_generate_body(
            &client,
            vec![LLMMessage::user(vec![
                LLMMessageType::image_bytes(b"png", "upload.png"),
                LLMMessageType::text("describe"),
            ])],
        );

        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "cG5n");
        assert_eq!(parts[1]["text"], "describe");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
    }

    #[test]
    fn finds_image_part_in_later_candidate() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "no picture here" }] } },
                { "content": { "parts": [
                    { "inlineData": { "mimeType": "text/plain", "data": "aGk=" } },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                ] } }
            ]
        }));

        let image = first_inline_image(&response).unwrap().expect("image part");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.bytes, vec![1, 2, 3]);
    }

    #[test]
    fn missing_image_part_is_none() {
        let response = parse(json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        }));
        assert!(first_inline_image(&response).unwrap().is_none());
        assert_eq!(response_to_text_data(&response).unwrap(), "");
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [
                { "inlineData": { "mimeType": "image/png", "data": "!!!" } }
            ] } }]
        }));
        assert!(first_inline_image(&response).is_err());
    }

    #[test]
    fn text_of_first_candidate_is_concatenated() {
        let response = parse(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "a " }, { "text": "b" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response_to_text_data(&response).unwrap(), "a b");
        assert!(response_to_text_data(&GeminiResponse::default()).is_err());
    }
}
