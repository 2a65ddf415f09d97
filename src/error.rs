use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::fenced::FenceError;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Failed to store generated image: {0}")]
    Storage(String),
    #[error("{0}")]
    Filesystem(String),
    #[error("{context}: {source}")]
    Flow {
        context: &'static str,
        #[source]
        source: Box<FlowError>,
    },
}

impl FlowError {
    pub fn upstream(error: impl std::fmt::Display) -> Self {
        FlowError::Upstream(format!("{error:#}"))
    }

    /// Wraps the error with the flow's failure message.
    pub fn within(self, context: &'static str) -> Self {
        FlowError::Flow {
            context,
            source: Box::new(self),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FlowError::MissingInput(_) | FlowError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FlowError::Flow { source, .. } => source.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status() == StatusCode::BAD_REQUEST
    }
}

impl From<FenceError> for FlowError {
    fn from(error: FenceError) -> Self {
        FlowError::Upstream(error.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
