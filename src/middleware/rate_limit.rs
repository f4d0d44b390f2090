use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, Request},
    http::{self, header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};

use crate::middleware::auth::AuthenticatedUser;
use crate::utils::jwt::Claims;

/// Type alias for the global governor layer (IP-based rate limiting)
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Per-user governor layer for authenticated routes
pub type UserGovernorLayer = GovernorLayer<
    UserIdExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Key extractor reading the user id from JWT claims in request extensions.
/// Must sit inside `auth_middleware`.
#[derive(Debug, Clone, Copy)]
pub struct UserIdExtractor;

impl KeyExtractor for UserIdExtractor {
    type Key = i32;

    fn extract<T>(&self, req: &http::Request<T>) -> Result<Self::Key, GovernorError> {
        let claims = req
            .extensions()
            .get::<Claims>()
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(claims.sub)
    }
}

/// Create a GovernorLayer for global rate limiting (per IP address)
/// - 1000 requests per minute (one token every 60ms)
/// - Applied before authentication to protect against DDoS
pub fn create_global_governor() -> GlobalGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(60) // One token every 60ms (1000 per minute)
            .burst_size(1000)    // Max capacity of the "window"
            .finish()
            .expect("valid global rate limit config"),
    );

    GovernorLayer::new(config).error_handler(rate_limit_error_handler)
}

/// Create a GovernorLayer for booking and payment routes
/// - 100 requests per minute per user, burst of 100
pub fn create_user_governor() -> UserGovernorLayer {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(600)
            .burst_size(100)
            .key_extractor(UserIdExtractor)
            .finish()
            .expect("valid per-user rate limit config"),
    );

    GovernorLayer::new(config).error_handler(rate_limit_error_handler)
}

/// Rate-limit rejections use the same `{"error": ...}` body as the API.
pub fn rate_limit_error_handler(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, wait_time.to_string())],
            Json(json!({ "error": "Too many requests" })),
        )
            .into_response(),
        GovernorError::UnableToExtractKey => {
            tracing::error!("Rate limiter could not identify the client");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
        _ => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Request rejected" })),
        )
            .into_response(),
    }
}

/// Logs every request once it completes, with latency and, on
/// authenticated routes, the caller's user id.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;

    let status = response.status();
    let user_id = response
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0);
    let latency_ms = started.elapsed().as_millis() as u64;

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(client_ip = %addr.ip(), %method, %route, ?user_id, "Rate limited");
    } else if status.is_server_error() {
        tracing::error!(client_ip = %addr.ip(), %method, %route, %status, ?user_id, latency_ms, "Request failed");
    } else if status.is_client_error() {
        tracing::info!(client_ip = %addr.ip(), %method, %route, %status, ?user_id, latency_ms, "Request rejected");
    } else {
        tracing::debug!(client_ip = %addr.ip(), %method, %route, %status, ?user_id, latency_ms, "Request completed");
    }

    response
}
