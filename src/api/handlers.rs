//! API Request Handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, StatusCode},
    response::Html,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::declared_origin;
use super::page::render_index;
use super::types::*;
use crate::domain::gate::RequestGate;
use crate::domain::origin::OriginPolicy;
use crate::models::config::{mask, set_or_not, sorted, AppConfig};
use crate::models::errors::{AppError, AppResult};
use crate::providers::dispatcher::{MailTransport, NotificationDispatcher};
use crate::utils::constants::APP_VERSION;

/// Shared application state, immutable after startup
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub policy: Arc<OriginPolicy>,
    pub gate: RequestGate,
    pub transport_name: &'static str,
    pub start_time: Instant,
    index_html: String,
}

impl AppState {
    /// Build state with the transport named in the configuration
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let dispatcher = NotificationDispatcher::from_config(&config.notification)?;
        Ok(Self::assemble(config, dispatcher))
    }

    /// Build state around a caller-supplied transport
    pub fn with_transport(config: AppConfig, transport: Arc<dyn MailTransport>) -> Self {
        let dispatcher = NotificationDispatcher::with_transport(&config.notification, transport);
        Self::assemble(config, dispatcher)
    }

    fn assemble(config: AppConfig, dispatcher: NotificationDispatcher) -> Self {
        let policy = Arc::new(OriginPolicy::new(config.origins.clone()));
        let transport_name = dispatcher.transport_name();
        let gate = RequestGate::new(policy.clone(), Arc::new(dispatcher));
        let index_html = render_index(
            &config.notification.app_name,
            &config.notification.to_email,
            &config.server.api_base,
        );

        Self {
            config: Arc::new(config),
            policy,
            gate,
            transport_name,
            start_time: Instant::now(),
            index_html,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// ============================================
// Capture Page
// ============================================

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.index_html.clone())
}

// ============================================
// Share Location
// ============================================

/// CORS preflight; headers are added by the CORS middleware
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn send_email(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ShareResponse>, AppError> {
    let origin = declared_origin(&headers);

    // An unreadable or oversized body still goes through the gate as empty
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            warn!(
                status = rejection.status().as_u16(),
                "Share body dropped: {}",
                rejection.body_text()
            );
            Bytes::new()
        }
    };

    match state.gate.handle_share(origin.as_deref(), &body).await {
        Ok(report) => {
            info!(
                lat = report.latitude,
                lng = report.longitude,
                "📍 Location shared"
            );
            Ok(Json(ShareResponse::accepted()))
        }
        Err(e) => {
            if e.http_status() < 500 {
                warn!(code = e.code_str(), "Share rejected: {}", e.message);
            }
            Err(e)
        }
    }
}

// ============================================
// Health Check
// ============================================

/// Never fails; secrets are masked or reported as SET / NOT SET
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    let n = &state.config.notification;
    let origins = &state.config.origins;

    let from_email = if n.from_email.is_empty() {
        "(not set)".to_string()
    } else {
        n.from_email.clone()
    };
    let to_email = if n.to_email.is_empty() {
        "(not set)".to_string()
    } else {
        n.to_email.clone()
    };
    let api_base = if state.config.server.api_base.is_empty() {
        "(same-origin)".to_string()
    } else {
        state.config.server.api_base.clone()
    };

    Json(HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        transport: state.transport_name.to_string(),
        smtp_host: n.smtp.host.clone(),
        smtp_port: n.smtp.port,
        use_ssl: n.smtp.use_ssl,
        username: mask(&n.smtp.username, 3),
        smtp_password: set_or_not(&n.smtp.password).to_string(),
        api_url: n.api.url.clone(),
        api_key: set_or_not(&n.api.api_key).to_string(),
        from_email,
        to_email,
        app_name: n.app_name.clone(),
        api_base,
        allowed_origins: sorted(origins.origins()),
        allowed_origin_suffixes: sorted(origins.suffixes()),
        allow_null_origin: origins.allow_null(),
    })
}
