//! Notification Dispatcher
//!
//! Composes the location email and hands it to exactly one transport,
//! chosen at startup. One request, one send attempt: no retry, no queue.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::http_api::HttpApiMailer;
use super::smtp::SmtpMailer;
use crate::domain::report::{subject_line, LocationReport};
use crate::models::config::{NotificationConfig, TransportKind};
use crate::models::errors::{AppError, AppResult};

/// Outcome of one send attempt; the error message is the transport's detail verbatim
pub type DispatchResult = AppResult<()>;

/// A composed plain-text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery mechanism for a composed message
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name for logs and the health snapshot
    fn name(&self) -> &'static str;

    /// Credential sanity checks. Failing here means nothing is sent.
    fn preflight(&self) -> AppResult<()>;

    /// Deliver one message, bounded by the dispatch timeout
    async fn deliver(&self, message: &EmailMessage) -> DispatchResult;
}

/// Sends location reports to the fixed recipient
pub struct NotificationDispatcher {
    transport: Arc<dyn MailTransport>,
    from_email: String,
    to_email: String,
    app_name: String,
}

impl NotificationDispatcher {
    /// Resolve the configured transport once
    pub fn from_config(config: &NotificationConfig) -> AppResult<Self> {
        let transport: Arc<dyn MailTransport> = match config.transport {
            TransportKind::Smtp => Arc::new(SmtpMailer::new(config.smtp.clone())?),
            TransportKind::HttpApi => Arc::new(HttpApiMailer::new(config.api.clone())?),
        };
        Ok(Self::with_transport(config, transport))
    }

    /// Use a caller-supplied transport (tests, alternative providers)
    pub fn with_transport(config: &NotificationConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            transport,
            from_email: config.from_email.clone(),
            to_email: config.to_email.clone(),
            app_name: config.app_name.clone(),
        }
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Build the message for a report
    pub fn compose(&self, report: &LocationReport) -> EmailMessage {
        EmailMessage {
            from: self.from_email.clone(),
            to: self.to_email.clone(),
            subject: subject_line(&self.app_name),
            body: report.message_body(&self.app_name),
        }
    }

    /// Validate configuration, then make a single delivery attempt
    pub async fn send(&self, report: &LocationReport) -> DispatchResult {
        if let Err(e) = self.preflight() {
            error!(code = e.code_str(), "❌ Send aborted: {}", e.message);
            return Err(e);
        }

        let message = self.compose(report);
        let start = Instant::now();

        match self.transport.deliver(&message).await {
            Ok(()) => {
                info!(
                    transport = self.transport.name(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "✅ Email sent to {}",
                    message.to
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    transport = self.transport.name(),
                    code = e.code_str(),
                    retryable = e.code.is_retryable(),
                    latency_ms = start.elapsed().as_millis() as u64,
                    "❌ Email delivery failed: {}",
                    e.message
                );
                Err(e)
            }
        }
    }

    fn preflight(&self) -> AppResult<()> {
        self.transport.preflight()?;
        if self.from_email.is_empty() {
            return Err(AppError::missing_address("Sender address (FROM_EMAIL) not set"));
        }
        if self.to_email.is_empty() {
            return Err(AppError::missing_address("Recipient address (TO_EMAIL) not set"));
        }
        Ok(())
    }
}
