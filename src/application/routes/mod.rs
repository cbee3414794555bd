pub mod comics;
pub mod support;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Request;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

use crate::application::errors::panic_response;
use crate::application::state::AppState;

/// 1 MB request body limit. Oversized bodies surface as JSON extractor rejections.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Browsers may cache preflight results for a day.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

pub fn app_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/generate-comic", post(comics::generate_comic))
        .route("/health", get(comics::health))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(ComicgenMakeSpan)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors_layer()),
        )
        .with_state(state)
}

/// Permissive CORS; `OPTIONS` requests are answered here without reaching a handler.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(PREFLIGHT_MAX_AGE)
}

#[derive(Clone)]
struct ComicgenMakeSpan;

impl<B> MakeSpan<B> for ComicgenMakeSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        tracing::info_span!(
            "request",
            id = %uuid::Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}
