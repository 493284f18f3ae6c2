//! API Route Configuration

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{cors_middleware, logging_middleware};
use crate::utils::constants::MAX_SHARE_BODY_BYTES;

const PERMISSIONS_POLICY: HeaderName = HeaderName::from_static("permissions-policy");

/// Create the router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/send-email",
            post(handlers::send_email)
                .options(handlers::preflight)
                .layer(DefaultBodyLimit::max(MAX_SHARE_BODY_BYTES)),
        )
        .route("/health", get(handlers::health_check))
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PERMISSIONS_POLICY,
            HeaderValue::from_static("geolocation=(self)"),
        ))
        .layer(middleware::from_fn(logging_middleware))
}
