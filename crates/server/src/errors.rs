use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::render;

/// A lookup that could not be answered. Rendered as an HTML page, never as a
/// bare protocol error.
#[derive(Debug)]
pub struct PageError(pub ServiceError);

impl From<ServiceError> for PageError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        error!(error = %self.0, corrupt = self.0.is_corrupt_store(), "lookup failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CACHE_CONTROL, "no-store")],
            Html(render::failure_page()),
        )
            .into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("record store unusable: {0}")]
    Store(#[from] ServiceError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
