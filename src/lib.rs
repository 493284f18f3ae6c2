//! Location Relay Library
//!
//! Consent-based location sharing over email:
//! - Origin allow-list with exact, suffix and opt-in `null` matching
//! - Strict payload validation (consent, finite coordinates)
//! - One-shot delivery through an SMTP relay or an HTTPS email API

pub mod api;
pub mod domain;
pub mod models;
pub mod providers;
pub mod utils;

pub use api::{create_router, AppState};
pub use domain::{LocationReport, OriginAllowList, OriginDecision, OriginPolicy, RequestGate};
pub use models::{AppConfig, AppError, AppResult, ErrorCode, NotificationConfig, TransportKind};
pub use providers::{DispatchResult, EmailMessage, MailTransport, NotificationDispatcher};
