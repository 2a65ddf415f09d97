pub mod auth;
pub mod generate;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::BasicAuth;
use crate::constants::{MAX_UPLOAD_BYTES, PUBLIC_UPLOADS_ROUTE};
use crate::pipeline::Pipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub upload_dir: PathBuf,
    pub public_uploads_dir: PathBuf,
}

pub fn build_router(state: Arc<AppState>, auth: Option<BasicAuth>) -> Router {
    let api = Router::new()
        .route("/image-description", post(generate::image_description))
        .route("/text-to-image", post(generate::text_to_image))
        .route("/image-inspired", post(generate::image_inspired))
        .route("/description-to-art", post(generate::description_to_art))
        .route("/photo-to-painting", post(generate::photo_to_painting))
        .route("/regenerate-image", post(generate::regenerate_image));

    let uploads = ServeDir::new(&state.public_uploads_dir);

    let router = Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .nest_service(PUBLIC_UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    match auth {
        Some(credentials) => router.layer(middleware::from_fn_with_state(
            Arc::new(credentials),
            auth::require_basic_auth,
        )),
        None => router,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
