//! SMTP Relay Transport
//!
//! Authenticated submission to a relay such as Brevo:
//! - `use_ssl = false`: plaintext greeting, mandatory STARTTLS upgrade, then AUTH (port 587)
//! - `use_ssl = true`: TLS wraps the socket before the greeting (port 465)
//!
//! A fresh connection is opened per message. The whole session is bounded by
//! the dispatch timeout.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::dispatcher::{DispatchResult, EmailMessage, MailTransport};
use crate::models::config::SmtpSettings;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::DISPATCH_TIMEOUT_SECS;

pub struct SmtpMailer {
    settings: SmtpSettings,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. No connection is made here.
    pub fn new(settings: SmtpSettings) -> AppResult<Self> {
        let builder = if settings.use_ssl {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(DISPATCH_TIMEOUT_SECS)))
            .build();

        Ok(Self {
            settings,
            transport,
        })
    }

    fn build_message(message: &EmailMessage) -> AppResult<Message> {
        let from: Mailbox = message.from.parse()?;
        let to: Mailbox = message.to.parse()?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())?;
        Ok(email)
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn preflight(&self) -> AppResult<()> {
        if self.settings.username.is_empty() || self.settings.password.is_empty() {
            return Err(AppError::missing_credentials("SMTP credentials not set"));
        }
        // Relays like Brevo log in with the account email
        if !self.settings.username.contains('@') {
            return Err(AppError::missing_credentials(
                "SMTP_USERNAME must be your relay login email",
            ));
        }
        Ok(())
    }

    async fn deliver(&self, message: &EmailMessage) -> DispatchResult {
        let email = Self::build_message(message)?;

        debug!(
            host = %self.settings.host,
            port = self.settings.port,
            use_ssl = self.settings.use_ssl,
            "Opening SMTP session"
        );

        let response = self.transport.send(email).await?;
        debug!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}
