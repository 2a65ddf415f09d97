use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::warn;

use crate::commands::AppState;
use crate::error::FlowError;
use crate::fs_utils::{remove_temp_file, save_upload};
use crate::models::{
    DescriptionToArtRequest, FlowInput, GenerationResult, Language, RegenerateImageRequest,
    TempUpload, TextToImageRequest,
};
use crate::pipeline::Flow;

type FlowResponse = Result<Json<GenerationResult>, FlowError>;

pub async fn image_description(State(state): State<Arc<AppState>>, multipart: Multipart) -> FlowResponse {
    let form = ImageForm::read(&state.upload_dir, multipart).await?;
    run_flow(&state, Flow::ImageDescription, form.into_input()).await
}

pub async fn text_to_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TextToImageRequest>, JsonRejection>,
) -> FlowResponse {
    let Json(payload) = payload.map_err(reject)?;
    let input = FlowInput {
        text: payload.prompt,
        language: payload.language,
        ..Default::default()
    };
    run_flow(&state, Flow::TextToImage, input).await
}

pub async fn image_inspired(State(state): State<Arc<AppState>>, multipart: Multipart) -> FlowResponse {
    let form = ImageForm::read(&state.upload_dir, multipart).await?;
    run_flow(&state, Flow::ImageInspired, form.into_input()).await
}

pub async fn description_to_art(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DescriptionToArtRequest>, JsonRejection>,
) -> FlowResponse {
    let Json(payload) = payload.map_err(reject)?;
    let input = FlowInput {
        text: payload.description,
        language: payload.language,
        ..Default::default()
    };
    run_flow(&state, Flow::DescriptionToArt, input).await
}

pub async fn photo_to_painting(State(state): State<Arc<AppState>>, multipart: Multipart) -> FlowResponse {
    let form = ImageForm::read(&state.upload_dir, multipart).await?;
    run_flow(&state, Flow::PhotoToPainting, form.into_input()).await
}

pub async fn regenerate_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegenerateImageRequest>, JsonRejection>,
) -> FlowResponse {
    let Json(payload) = payload.map_err(reject)?;
    let input = FlowInput {
        text: payload.prompt,
        ..Default::default()
    };
    run_flow(&state, Flow::RegenerateImage, input).await
}

async fn run_flow(state: &AppState, flow: Flow, input: FlowInput) -> FlowResponse {
    match state.pipeline.run(flow, input).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            if err.is_client_error() {
                warn!(flow = flow.config().name, error = %err, "rejected request");
            }
            Err(err)
        }
    }
}

fn reject(rejection: JsonRejection) -> FlowError {
    FlowError::InvalidRequest(rejection.body_text())
}

/// Fields of a multipart image form. The `image` part is written to the
/// upload directory as soon as it is read.
#[derive(Debug, Default)]
struct ImageForm {
    image: Option<TempUpload>,
    instructions: Option<String>,
    language: Option<String>,
}

impl ImageForm {
    async fn read(upload_dir: &Path, mut multipart: Multipart) -> Result<Self, FlowError> {
        let mut form = ImageForm::default();
        match form.read_fields(upload_dir, &mut multipart).await {
            Ok(()) => Ok(form),
            Err(err) => {
                if let Some(upload) = &form.image {
                    remove_temp_file(upload).await;
                }
                Err(err)
            }
        }
    }

    async fn read_fields(&mut self, upload_dir: &Path, multipart: &mut Multipart) -> Result<(), FlowError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| FlowError::InvalidRequest(err.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" if self.image.is_none() => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| FlowError::InvalidRequest(err.body_text()))?;
                    if bytes.is_empty() {
                        continue;
                    }
                    let upload = save_upload(upload_dir, &file_name, &bytes)
                        .await
                        .map_err(FlowError::Filesystem)?;
                    self.image = Some(upload);
                }
                "instructions" | "language" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|err| FlowError::InvalidRequest(err.body_text()))?;
                    if name == "instructions" {
                        self.instructions = Some(value);
                    } else {
                        self.language = Some(value);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn into_input(self) -> FlowInput {
        FlowInput {
            image: self.image,
            text: None,
            instructions: self.instructions,
            language: Language::parse(self.language.as_deref()),
        }
    }
}
