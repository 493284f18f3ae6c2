//! Request Gate
//!
//! One share request, start to finish:
//! origin check → payload parse → consent → coordinates → dispatch.
//! The first failing step ends the request; nothing is kept between requests.

use std::sync::Arc;

use tracing::debug;

use super::origin::OriginPolicy;
use super::report::{local_timestamp, parse_payload, LocationReport};
use crate::models::errors::{AppError, AppResult};
use crate::providers::dispatcher::NotificationDispatcher;

#[derive(Clone)]
pub struct RequestGate {
    policy: Arc<OriginPolicy>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl RequestGate {
    pub fn new(policy: Arc<OriginPolicy>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { policy, dispatcher }
    }

    /// Run the pipeline. `Ok(report)` means the email was handed off.
    pub async fn handle_share(&self, origin: Option<&str>, body: &[u8]) -> AppResult<LocationReport> {
        let allow_list = self.policy.allow_list();
        debug!(
            origin = ?origin,
            allowed = ?allow_list.origins(),
            suffixes = ?allow_list.suffixes(),
            null_allowed = allow_list.allow_null(),
            "[send-email] request"
        );

        if !self.policy.is_allowed(origin) {
            return Err(AppError::origin_not_allowed(origin));
        }

        let payload = parse_payload(body);
        let report = LocationReport::from_payload(&payload, local_timestamp())?;

        self.dispatcher.send(&report).await?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::AppConfig;
    use crate::models::errors::ErrorCode;
    use crate::providers::dispatcher::{DispatchResult, EmailMessage, MailTransport};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MailTransport for CountingTransport {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn preflight(&self) -> AppResult<()> {
            Ok(())
        }

        async fn deliver(&self, _message: &EmailMessage) -> DispatchResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn gate(transport: Arc<CountingTransport>) -> RequestGate {
        let config = AppConfig::from_lookup(|key| match key {
            "ALLOWED_ORIGINS" => Some("https://app.example.com".to_string()),
            "FROM_EMAIL" => Some("relay@example.com".to_string()),
            "TO_EMAIL" => Some("owner@example.com".to_string()),
            _ => None,
        })
        .unwrap();
        let policy = Arc::new(OriginPolicy::new(config.origins.clone()));
        let dispatcher = NotificationDispatcher::with_transport(&config.notification, transport);
        RequestGate::new(policy, Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn test_accepted_share_dispatches_once() {
        let transport = Arc::new(CountingTransport::default());
        let gate = gate(transport.clone());

        let body = br#"{"consent": true, "lat": "37.422", "lng": -122.084}"#;
        let report = gate
            .handle_share(Some("https://app.example.com"), body)
            .await
            .unwrap();

        assert_eq!(report.latitude, 37.422);
        assert_eq!(report.accuracy, "unknown");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_failing_step_wins() {
        let transport = Arc::new(CountingTransport::default());
        let gate = gate(transport.clone());

        let err = gate
            .handle_share(Some("https://other.example.com"), b"not json")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OriginNotAllowed);

        let err = gate
            .handle_share(None, br#"{"consent": true, "lat": 1.0}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoordinates);

        let err = gate
            .handle_share(None, br#"{"consent": "yes"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConsentRequired);

        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
