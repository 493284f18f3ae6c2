//! Configuration module for the location relay
//!
//! All settings come from the environment and are read exactly once at
//! startup. The resulting [`AppConfig`] is immutable and shared by reference.
//! Secrets have no compiled-in defaults and are never logged.

use std::collections::BTreeSet;
use std::fmt;

use tracing::info;

use super::errors::{AppError, AppResult};
use crate::domain::origin::{normalize_origin, normalize_suffix, OriginAllowList};
use crate::utils::constants::{
    DEFAULT_ALLOWED_ORIGINS, DEFAULT_APP_NAME, DEFAULT_EMAIL_API_URL, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT, ENV_ALLOWED_ORIGINS, ENV_ALLOWED_ORIGIN_SUFFIXES,
    ENV_ALLOW_NULL_ORIGIN, ENV_API_BASE, ENV_APP_NAME, ENV_EMAIL_API_KEY, ENV_EMAIL_API_URL,
    ENV_EMAIL_TRANSPORT, ENV_FROM_EMAIL, ENV_HOST, ENV_PORT, ENV_SMTP_HOST, ENV_SMTP_PASSWORD,
    ENV_SMTP_PORT, ENV_SMTP_USERNAME, ENV_TO_EMAIL, ENV_USE_SSL,
};

/// Which transport delivers the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Authenticated SMTP relay
    Smtp,
    /// HTTPS transactional-email API
    HttpApi,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smtp => "smtp",
            Self::HttpApi => "api",
        }
    }

    /// Parse the `EMAIL_TRANSPORT` value
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "smtp" => Ok(Self::Smtp),
            "api" | "http" | "https" => Ok(Self::HttpApi),
            other => Err(AppError::invalid_config(format!(
                "{} must be 'smtp' or 'api', got '{}'",
                ENV_EMAIL_TRANSPORT, other
            ))),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SMTP relay settings
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Implicit TLS (usually 465); otherwise STARTTLS after the greeting
    pub use_ssl: bool,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &mask(&self.username, 3))
            .field("password", &set_or_not(&self.password))
            .field("use_ssl", &self.use_ssl)
            .finish()
    }
}

/// HTTPS email API settings
#[derive(Clone)]
pub struct ApiSettings {
    pub url: String,
    pub api_key: String,
}

impl fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSettings")
            .field("url", &self.url)
            .field("api_key", &set_or_not(&self.api_key))
            .finish()
    }
}

/// Everything the dispatcher needs
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub transport: TransportKind,
    pub smtp: SmtpSettings,
    pub api: ApiSettings,
    /// Sender address (falls back to the SMTP username)
    pub from_email: String,
    /// Fixed recipient
    pub to_email: String,
    /// Display name used in subject and body
    pub app_name: String,
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Externally reachable base URL the page posts to; empty = same origin
    pub api_base: String,
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub notification: NotificationConfig,
    pub origins: OriginAllowList,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    /// Values are trimmed; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let transport = TransportKind::parse(&get(ENV_EMAIL_TRANSPORT).unwrap_or_default())?;

        let smtp_port = match get(ENV_SMTP_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::invalid_config(format!("{} must be a port number, got '{}'", ENV_SMTP_PORT, raw))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let smtp = SmtpSettings {
            host: get_or(ENV_SMTP_HOST, DEFAULT_SMTP_HOST),
            port: smtp_port,
            username: get_or(ENV_SMTP_USERNAME, ""),
            password: get_or(ENV_SMTP_PASSWORD, ""),
            use_ssl: parse_flag(get(ENV_USE_SSL).as_deref()),
        };

        let api = ApiSettings {
            url: get_or(ENV_EMAIL_API_URL, DEFAULT_EMAIL_API_URL),
            api_key: get_or(ENV_EMAIL_API_KEY, ""),
        };

        let from_email = get(ENV_FROM_EMAIL).unwrap_or_else(|| smtp.username.clone());

        let notification = NotificationConfig {
            transport,
            smtp,
            api,
            from_email,
            to_email: get_or(ENV_TO_EMAIL, ""),
            app_name: get_or(ENV_APP_NAME, DEFAULT_APP_NAME),
        };

        let origins = match get(ENV_ALLOWED_ORIGINS) {
            Some(raw) => split_list(&raw).filter_map(normalize_origin).collect(),
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .filter_map(|o| normalize_origin(o))
                .collect(),
        };
        let suffixes = get(ENV_ALLOWED_ORIGIN_SUFFIXES)
            .map(|raw| split_list(&raw).filter_map(normalize_suffix).collect())
            .unwrap_or_default();
        let allow_null = parse_flag(get(ENV_ALLOW_NULL_ORIGIN).as_deref());

        let port = match get(ENV_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::invalid_config(format!("{} must be a port number, got '{}'", ENV_PORT, raw))
            })?,
            None => DEFAULT_PORT,
        };

        let server = ServerConfig {
            host: get_or(ENV_HOST, DEFAULT_HOST),
            port,
            api_base: get_or(ENV_API_BASE, "").trim_end_matches('/').to_string(),
        };

        Ok(Self {
            notification,
            origins: OriginAllowList::new(origins, suffixes, allow_null),
            server,
        })
    }

    /// Log a startup summary. Secrets are reported only as SET / NOT SET.
    pub fn log_summary(&self) {
        let n = &self.notification;
        info!("📮 Transport: {}", n.transport);
        match n.transport {
            TransportKind::Smtp => info!(
                host = %n.smtp.host,
                port = n.smtp.port,
                use_ssl = n.smtp.use_ssl,
                username = %mask(&n.smtp.username, 3),
                password = set_or_not(&n.smtp.password),
                "SMTP relay configured"
            ),
            TransportKind::HttpApi => info!(
                url = %n.api.url,
                api_key = set_or_not(&n.api.api_key),
                "Email API configured"
            ),
        }
        info!("Allowed origins: {:?}", self.origins.origins());
        info!("Allowed suffixes: {:?}", self.origins.suffixes());
        info!("ALLOW_NULL_ORIGIN: {}", self.origins.allow_null());
        if n.to_email.is_empty() {
            tracing::warn!("⚠️ {} not set, every send will fail", ENV_TO_EMAIL);
        }
    }
}

/// `true` only for the literal (case-insensitive) "true"
fn parse_flag(value: Option<&str>) -> bool {
    value.map(|v| v.trim().eq_ignore_ascii_case("true")).unwrap_or(false)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Keep the first `keep` characters of a secret-ish value.
/// Empty values are reported as "NOT SET".
pub fn mask(value: &str, keep: usize) -> String {
    if value.is_empty() {
        return "NOT SET".to_string();
    }
    let head: String = value.chars().take(keep).collect();
    format!("{}…*****", head)
}

/// Presence-only report for secrets
pub fn set_or_not(value: &str) -> &'static str {
    if value.is_empty() {
        "NOT SET"
    } else {
        "SET"
    }
}

/// Sorted copy for stable output
pub fn sorted(values: &BTreeSet<String>) -> Vec<String> {
    values.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> AppResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        let n = &config.notification;
        assert_eq!(n.transport, TransportKind::Smtp);
        assert_eq!(n.smtp.host, "smtp-relay.brevo.com");
        assert_eq!(n.smtp.port, 587);
        assert!(!n.smtp.use_ssl);
        assert!(n.smtp.username.is_empty());
        assert!(n.smtp.password.is_empty());
        assert_eq!(n.app_name, "Campus Connect");
        assert_eq!(config.server.port, 5000);
        assert!(config.server.api_base.is_empty());
        assert!(config.origins.origins().contains("http://localhost:5000"));
        assert!(config.origins.origins().contains("http://127.0.0.1:5000"));
        assert!(config.origins.suffixes().is_empty());
        assert!(!config.origins.allow_null());
    }

    #[test]
    fn test_from_email_falls_back_to_username() {
        let config = load(&[("SMTP_USERNAME", "  relay@example.com ")]).unwrap();
        assert_eq!(config.notification.from_email, "relay@example.com");

        let config = load(&[
            ("SMTP_USERNAME", "relay@example.com"),
            ("FROM_EMAIL", "noreply@example.com"),
        ])
        .unwrap();
        assert_eq!(config.notification.from_email, "noreply@example.com");
    }

    #[test]
    fn test_origin_lists_are_normalized() {
        let config = load(&[
            ("ALLOWED_ORIGINS", "HTTPS://App.Example.com/, example.org/path , ,"),
            ("ALLOWED_ORIGIN_SUFFIXES", " .Vercel.App ,"),
            ("ALLOW_NULL_ORIGIN", "TRUE"),
        ])
        .unwrap();

        let origins = sorted(config.origins.origins());
        assert_eq!(origins, vec!["https://app.example.com", "https://example.org"]);
        assert_eq!(sorted(config.origins.suffixes()), vec![".vercel.app"]);
        assert!(config.origins.allow_null());
    }

    #[test]
    fn test_transport_selection() {
        let config = load(&[("EMAIL_TRANSPORT", "API"), ("EMAIL_API_KEY", "re_123")]).unwrap();
        assert_eq!(config.notification.transport, TransportKind::HttpApi);
        assert_eq!(config.notification.api.url, "https://api.resend.com/emails");
        assert_eq!(config.notification.api.api_key, "re_123");

        let err = load(&[("EMAIL_TRANSPORT", "pigeon")]).unwrap_err();
        assert!(err.code.is_configuration());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = load(&[("SMTP_PORT", "smtp")]).unwrap_err();
        assert!(err.message.contains("SMTP_PORT"));
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" True ")));
        assert!(!parse_flag(Some("1")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("", 3), "NOT SET");
        assert_eq!(mask("info@example.com", 3), "inf…*****");
        assert_eq!(mask("ab", 3), "ab…*****");
        assert_eq!(set_or_not("secret"), "SET");
        assert_eq!(set_or_not(""), "NOT SET");
    }

    #[test]
    fn test_debug_never_prints_secrets() {
        let config = load(&[
            ("SMTP_USERNAME", "user@example.com"),
            ("SMTP_PASSWORD", "xkeysib-super-secret"),
            ("EMAIL_API_KEY", "re_super_secret"),
        ])
        .unwrap();
        let dump = format!("{:?}", config);
        assert!(!dump.contains("super-secret"));
        assert!(!dump.contains("re_super_secret"));
        assert!(dump.contains("use…*****"));
    }
}
