//! Cross-cutting HTTP layers: CORS for the browser front end and
//! per-request tracing spans.

use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::CorsConfig;

/// Preflight responses may be cached by browsers for this long
const CORS_MAX_AGE: Duration = Duration::from_secs(3600);

/// `true` when every origin is allowed
fn is_wildcard(origins: &[String]) -> bool {
    origins.is_empty() || origins.iter().any(|o| o == "*")
}

/// Parse configured origins, skipping (and logging) the ones that are not
/// valid header values
fn parse_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            },
        })
        .collect()
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let wildcard = is_wildcard(&config.allowed_origins);
    let origin = if wildcard {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_origins(&config.allowed_origins))
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION])
        // tower-http rejects credentials combined with a wildcard origin
        .allow_credentials(config.allow_credentials && !wildcard)
        .max_age(CORS_MAX_AGE)
}

/// Span per request; 5xx responses are reported at error level
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
        .on_failure(DefaultOnFailure::new().level(Level::ERROR))
}
