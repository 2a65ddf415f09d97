mod commands;
mod config;
mod constants;
mod error;
mod fenced;
mod fs_utils;
mod gateway;
mod models;
mod pipeline;
mod prompts;
mod storage;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub use commands::{build_router, AppState};
pub use config::{BasicAuth, Settings};
pub use constants::{
    DEFAULT_BLOB_API_URL, DEFAULT_DESCRIPTION_MODEL, DEFAULT_GEMINI_ENDPOINT, DEFAULT_IMAGE_MODEL,
    PUBLIC_UPLOADS_ROUTE,
};
pub use error::{ErrorBody, FlowError};
pub use fenced::{extract_fenced, FenceError};
pub use gateway::{ChatSession, GeminiGateway, GenerativeBackend, ModelKind};
pub use models::{
    DescriptionToArtRequest, FlowInput, GenerationResult, Language, RegenerateImageRequest,
    TempUpload, TextToImageRequest,
};
pub use pipeline::{Flow, FlowConfig, InputKind, Pipeline};
pub use storage::{BlobImageStore, ImageStore, LocalImageStore};

/// Installs the `RUST_LOG`-driven subscriber, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::from_env()?;
    let http = reqwest::Client::new();

    let backend = Arc::new(GeminiGateway::new(http.clone(), &settings));
    let store: Arc<dyn ImageStore> = match &settings.blob_token {
        Some(token) => {
            info!(api = %settings.blob_api_url, "storing generated images in blob storage");
            Arc::new(BlobImageStore::new(http, settings.blob_api_url.clone(), token.clone()))
        }
        None => {
            info!(dir = %settings.public_uploads_dir.display(), "storing generated images locally");
            Arc::new(LocalImageStore::new(settings.public_uploads_dir.clone()))
        }
    };

    fs_utils::spawn_upload_sweeper(
        settings.public_uploads_dir.clone(),
        settings.upload_dir.clone(),
    );

    let state = AppState {
        pipeline: Pipeline::new(backend, store),
        upload_dir: settings.upload_dir.clone(),
        public_uploads_dir: settings.public_uploads_dir.clone(),
    };
    let app = build_router(Arc::new(state), settings.auth.clone());

    let addr = settings.socket_addr()?;
    info!(
        %addr,
        description_model = %settings.description_model,
        image_model = %settings.image_model,
        auth = settings.auth.is_some(),
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
