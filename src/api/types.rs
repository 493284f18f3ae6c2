//! API Request/Response Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::errors::AppError;

/// Body of every `/send-email` response: `{ok:true}` or `{ok:false, error, code}`
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ShareResponse {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
            code: None,
        }
    }

    /// Error detail is passed through verbatim
    pub fn rejected(err: &AppError) -> Self {
        Self {
            ok: false,
            error: Some(err.message.clone()),
            code: Some(err.code_str()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ShareResponse::rejected(&self))).into_response()
    }
}

// ============================================
// Health Check
// ============================================

/// Masked configuration snapshot for operators
#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub transport: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub use_ssl: bool,
    pub username: String,
    pub smtp_password: String,
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
    pub to_email: String,
    pub app_name: String,
    pub api_base: String,
    pub allowed_origins: Vec<String>,
    pub allowed_origin_suffixes: Vec<String>,
    pub allow_null_origin: bool,
}
