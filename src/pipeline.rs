//! The request flows. Every flow is the same fixed sequence of steps
//! (describe, build an art prompt, generate pixels, translate, persist) with
//! a [`FlowConfig`] choosing which of them run.

use std::sync::Arc;

use llmapi::gemini::first_inline_image;
use llmapi::{LLMMessage, LLMMessageType};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::FlowError;
use crate::fenced::extract_fenced;
use crate::fs_utils::{remove_temp_file, timestamped_file_name, upload_mime_type};
use crate::gateway::{ChatSession, GenerativeBackend, ModelKind};
use crate::models::{FlowInput, GenerationResult, Language, TempUpload};
use crate::prompts::{build_art_prompt_request, build_translation_request, ArtStyle, DESCRIPTION_PROMPT};
use crate::storage::ImageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Image,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowConfig {
    pub name: &'static str,
    pub input: InputKind,
    pub missing_input: &'static str,
    pub failure_context: &'static str,
    pub needs_description: bool,
    pub needs_art_prompt: bool,
    pub art_style: ArtStyle,
    pub needs_image: bool,
    /// Without an image part the flow fails instead of returning text only.
    pub image_required: bool,
    pub needs_translation: bool,
    pub file_prefix: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ImageDescription,
    TextToImage,
    ImageInspired,
    DescriptionToArt,
    PhotoToPainting,
    RegenerateImage,
}

impl Flow {
    pub fn config(self) -> FlowConfig {
        match self {
            Flow::ImageDescription => FlowConfig {
                name: "image-description",
                input: InputKind::Image,
                missing_input: "No image uploaded.",
                failure_context: "Failed to generate description",
                needs_description: true,
                needs_art_prompt: false,
                art_style: ArtStyle::Painting,
                needs_image: false,
                image_required: false,
                needs_translation: true,
                file_prefix: "description",
            },
            Flow::TextToImage => FlowConfig {
                name: "text-to-image",
                input: InputKind::Text,
                missing_input: "No prompt provided.",
                failure_context: "Failed to generate image",
                needs_description: false,
                needs_art_prompt: false,
                art_style: ArtStyle::Painting,
                needs_image: true,
                image_required: true,
                needs_translation: true,
                file_prefix: "generated",
            },
            Flow::ImageInspired => FlowConfig {
                name: "image-inspired",
                input: InputKind::Image,
                missing_input: "No image uploaded.",
                failure_context: "Failed to generate inspired art",
                needs_description: true,
                needs_art_prompt: true,
                art_style: ArtStyle::Painting,
                needs_image: true,
                image_required: false,
                needs_translation: true,
                file_prefix: "inspired",
            },
            Flow::DescriptionToArt => FlowConfig {
                name: "description-to-art",
                input: InputKind::Text,
                missing_input: "No description provided.",
                failure_context: "Failed to generate art from description",
                needs_description: false,
                needs_art_prompt: true,
                art_style: ArtStyle::Painting,
                needs_image: true,
                image_required: false,
                needs_translation: true,
                file_prefix: "description-art",
            },
            Flow::PhotoToPainting => FlowConfig {
                name: "photo-to-painting",
                input: InputKind::Image,
                missing_input: "No image uploaded.",
                failure_context: "Failed to generate photo-to-painting",
                needs_description: true,
                needs_art_prompt: true,
                art_style: ArtStyle::PhotoToPainting,
                needs_image: true,
                image_required: false,
                needs_translation: true,
                file_prefix: "photo-to-painting",
            },
            Flow::RegenerateImage => FlowConfig {
                name: "regenerate-image",
                input: InputKind::Text,
                missing_input: "No prompt provided.",
                failure_context: "Failed to regenerate image",
                needs_description: false,
                needs_art_prompt: false,
                art_style: ArtStyle::Painting,
                needs_image: true,
                image_required: true,
                needs_translation: false,
                file_prefix: "regenerated",
            },
        }
    }
}

/// Client handles shared by every flow, built once at startup.
#[derive(Clone)]
pub struct Pipeline {
    backend: Arc<dyn GenerativeBackend>,
    store: Arc<dyn ImageStore>,
}

impl Pipeline {
    pub fn new(backend: Arc<dyn GenerativeBackend>, store: Arc<dyn ImageStore>) -> Self {
        Self { backend, store }
    }

    /// Runs `flow` and deletes the uploaded file afterwards, whatever the
    /// outcome.
    pub async fn run(&self, flow: Flow, input: FlowInput) -> Result<GenerationResult, FlowError> {
        let result = self.run_with(&flow.config(), &input).await;
        if let Some(upload) = &input.image {
            remove_temp_file(upload).await;
        }
        result
    }

    pub async fn run_with(
        &self,
        config: &FlowConfig,
        input: &FlowInput,
    ) -> Result<GenerationResult, FlowError> {
        let source = validate(config, input)?;
        info!(flow = config.name, language = %input.language, "starting flow");

        self.execute(config, input, source).await.map_err(|err| {
            error!(flow = config.name, error = %err, "flow failed");
            err.within(config.failure_context)
        })
    }

    async fn execute(
        &self,
        config: &FlowConfig,
        input: &FlowInput,
        source: Source<'_>,
    ) -> Result<GenerationResult, FlowError> {
        let arabic = config.needs_translation && input.language == Language::Ar;
        let mut session = ChatSession::new(self.backend.as_ref(), ModelKind::Description);
        let mut result = GenerationResult::default();

        // user text in Arabic is brought to English before it reaches a model
        let mut english_text = match source {
            Source::Text(text) if arabic => Some(self.translate(text, Language::En).await?),
            Source::Text(text) => Some(text.to_string()),
            Source::Image(_) => None,
        };

        let description = match source {
            Source::Image(upload) if config.needs_description => {
                let description = describe_image(&mut session, upload).await?;
                debug!(flow = config.name, %description, "generated description");
                Some(description)
            }
            _ => None,
        };

        let prompt = if config.needs_art_prompt {
            let base = description
                .as_deref()
                .or(english_text.as_deref())
                .unwrap_or_default();
            let request =
                build_art_prompt_request(base, input.instructions.as_deref(), config.art_style);
            let reply = session
                .send_for_text(vec![LLMMessageType::text(request)])
                .await
                .map_err(FlowError::upstream)?;
            let prompt = extract_fenced(&reply)?;
            debug!(flow = config.name, %prompt, "generated art prompt");
            Some(prompt)
        } else {
            english_text.take()
        };

        let image = match (&prompt, config.needs_image) {
            (Some(prompt), true) => self.generate_image(config, prompt).await?,
            _ => None,
        };

        if let Some(description) = description {
            result.description = Some(if arabic {
                self.translate(&description, Language::Ar).await?
            } else {
                description
            });
        }

        if config.needs_art_prompt {
            if let Some(prompt) = &prompt {
                result.prompt = Some(if arabic {
                    self.translate(prompt, Language::Ar).await?
                } else {
                    prompt.clone()
                });
            }
            result.english_prompt = prompt;
        } else if arabic && config.needs_image {
            result.english_prompt = prompt;
        }

        if let Some((file_name, bytes, mime_type)) = image {
            let url = self
                .store
                .put(&file_name, bytes, &mime_type)
                .await
                .map_err(|err| FlowError::Storage(format!("{err:#}")))?;
            info!(flow = config.name, %url, "image stored");
            result.image_url = Some(url);
        }

        Ok(result)
    }

    /// Returns the file name, bytes and mime type of the generated image, or
    /// `None` when the model answered without one and the flow tolerates it.
    async fn generate_image(
        &self,
        config: &FlowConfig,
        prompt: &str,
    ) -> Result<Option<(String, Vec<u8>, String)>, FlowError> {
        let response = self
            .backend
            .generate(
                ModelKind::ImageGeneration,
                vec![LLMMessage::user(vec![LLMMessageType::text(prompt)])],
            )
            .await
            .map_err(FlowError::upstream)?;

        match first_inline_image(&response).map_err(FlowError::upstream)? {
            Some(image) if image.bytes.is_empty() => Err(FlowError::Upstream(
                "Empty image data received from Gemini API.".into(),
            )),
            Some(image) => {
                let file_name = timestamped_file_name(config.file_prefix, &image.mime_type);
                Ok(Some((file_name, image.bytes, image.mime_type)))
            }
            None if config.image_required => Err(FlowError::Upstream(
                "No valid image generated by Gemini API.".into(),
            )),
            None => {
                warn!(flow = config.name, %prompt, "no image generated for prompt");
                Ok(None)
            }
        }
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, FlowError> {
        let mut session = ChatSession::new(self.backend.as_ref(), ModelKind::Description);
        let reply = session
            .send_for_text(vec![LLMMessageType::text(build_translation_request(
                text, target,
            ))])
            .await
            .map_err(|err| {
                FlowError::Upstream(format!("Translation to {} failed: {err:#}", target.name()))
            })?;
        Ok(extract_fenced(&reply)?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Image(&'a TempUpload),
    Text(&'a str),
}

fn validate<'a>(config: &FlowConfig, input: &'a FlowInput) -> Result<Source<'a>, FlowError> {
    match config.input {
        InputKind::Image => input
            .image
            .as_ref()
            .map(Source::Image)
            .ok_or(FlowError::MissingInput(config.missing_input)),
        InputKind::Text => input
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(Source::Text)
            .ok_or(FlowError::MissingInput(config.missing_input)),
    }
}

async fn describe_image(
    session: &mut ChatSession<'_>,
    upload: &TempUpload,
) -> Result<String, FlowError> {
    let mime_type = upload_mime_type(&upload.path).map_err(FlowError::Filesystem)?;
    debug!(path = %upload.path.display(), mime_type, "sending upload to vision model");

    let bytes = fs::read(&upload.path).await.map_err(|err| {
        FlowError::Filesystem(format!(
            "Image file not found at {}: {}",
            upload.path.display(),
            err
        ))
    })?;

    let reply = session
        .send_for_text(vec![
            LLMMessageType::image_bytes(&bytes, upload.path.to_string_lossy()),
            LLMMessageType::text(DESCRIPTION_PROMPT),
        ])
        .await
        .map_err(FlowError::upstream)?;

    Ok(extract_fenced(&reply)?)
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
