//! HTTPS Email API Transport
//!
//! One bearer-authenticated JSON POST per message:
//!
//! ```text
//! POST {EMAIL_API_URL}
//! Authorization: Bearer {EMAIL_API_KEY}
//! {"from": "...", "to": ["..."], "subject": "...", "text": "..."}
//! ```
//!
//! Any status >= 400 is a failure and the response body becomes the error detail.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::dispatcher::{DispatchResult, EmailMessage, MailTransport};
use crate::models::config::ApiSettings;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{DISPATCH_TIMEOUT_SECS, USER_AGENT};

/// Request body for the email API
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

pub struct HttpApiMailer {
    settings: ApiSettings,
    client: Client,
}

impl HttpApiMailer {
    pub fn new(settings: ApiSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DISPATCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { settings, client })
    }
}

#[async_trait]
impl MailTransport for HttpApiMailer {
    fn name(&self) -> &'static str {
        "api"
    }

    fn preflight(&self) -> AppResult<()> {
        if self.settings.api_key.is_empty() {
            return Err(AppError::missing_credentials("Email API key not set"));
        }
        if self.settings.url.is_empty() {
            return Err(AppError::invalid_config("Email API URL not set"));
        }
        Ok(())
    }

    async fn deliver(&self, message: &EmailMessage) -> DispatchResult {
        let payload = SendEmailRequest {
            from: &message.from,
            to: [&message.to],
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(&self.settings.url)
            .bearer_auth(&self.settings.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.trim().is_empty() {
                format!("Email API returned HTTP {}", status.as_u16())
            } else {
                body
            };
            return Err(AppError::remote_api(detail));
        }

        debug!(status = status.as_u16(), "Email API accepted message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>;

    /// Local stand-in for the email API
    async fn spawn_api(status: StatusCode, reply: &'static str) -> (String, Captured) {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route(
                "/emails",
                post(
                    move |State(seen): State<Captured>,
                          headers: HeaderMap,
                          Json(body): Json<serde_json::Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((auth, body));
                        (status, reply)
                    },
                ),
            )
            .with_state(captured.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/emails", addr), captured)
    }

    fn message() -> EmailMessage {
        EmailMessage {
            from: "sender@example.com".to_string(),
            to: "owner@example.com".to_string(),
            subject: "Relay — Location Share (with consent)".to_string(),
            body: "Latitude: 1\n".to_string(),
        }
    }

    #[tokio::test]
    async fn test_delivers_with_bearer_and_json() {
        let (url, captured) = spawn_api(StatusCode::OK, r#"{"id":"abc"}"#).await;
        let mailer = HttpApiMailer::new(ApiSettings {
            url,
            api_key: "re_test".to_string(),
        })
        .unwrap();

        mailer.deliver(&message()).await.unwrap();

        let seen = captured.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("Bearer re_test"));
        assert_eq!(
            seen[0].1,
            serde_json::json!({
                "from": "sender@example.com",
                "to": ["owner@example.com"],
                "subject": "Relay — Location Share (with consent)",
                "text": "Latitude: 1\n"
            })
        );
    }

    #[tokio::test]
    async fn test_error_status_surfaces_body() {
        let reply = r#"{"statusCode":403,"message":"The from address is not verified"}"#;
        let (url, _) = spawn_api(StatusCode::FORBIDDEN, reply).await;
        let mailer = HttpApiMailer::new(ApiSettings {
            url,
            api_key: "re_test".to_string(),
        })
        .unwrap();

        let err = mailer.deliver(&message()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RemoteApiError);
        assert_eq!(err.message, reply);
    }

    #[tokio::test]
    async fn test_empty_error_body_reports_status() {
        let (url, _) = spawn_api(StatusCode::BAD_GATEWAY, "").await;
        let mailer = HttpApiMailer::new(ApiSettings {
            url,
            api_key: "re_test".to_string(),
        })
        .unwrap();

        let err = mailer.deliver(&message()).await.unwrap_err();
        assert_eq!(err.message, "Email API returned HTTP 502");
    }

    #[tokio::test]
    async fn test_preflight_requires_key() {
        let mailer = HttpApiMailer::new(ApiSettings {
            url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
        })
        .unwrap();
        let err = mailer.preflight().unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissingCredentials);
    }
}
