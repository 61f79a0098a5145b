use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::types::Health;
use service::lookup::{identifier_from_path, LookupService};

use crate::errors::PageError;
use crate::render;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub lookup: LookupService,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// `GET /`: instructions only, the store is not consulted.
pub async fn landing() -> Html<String> {
    Html(render::landing_page())
}

/// Any non-root path: the percent-decoded path (minus the leading `/`) is the
/// identifier, so `/a/b` asks for `a/b`. Always 200 unless the store fails.
///
/// `HEAD` gets an empty 200 and never counts a scan.
pub async fn lookup(State(state): State<AppState>, method: Method, uri: Uri) -> Result<Response, PageError> {
    if method == Method::HEAD {
        return Ok(([(header::CACHE_CONTROL, "no-store")], StatusCode::OK).into_response());
    }
    if method != Method::GET {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }
    let identifier = identifier_from_path(uri.path()).unwrap_or_default();
    let outcome = state.lookup.lookup(&identifier).await?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Html(render::outcome_page(&outcome))).into_response())
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health))
        .fallback(lookup)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx pages are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
