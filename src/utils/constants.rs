//! Constants Module - Single Source of Truth
//!
//! Every default, fixed URL and timeout used by the service lives here.
//! No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Default display name used in the page and the email
pub const DEFAULT_APP_NAME: &str = "Campus Connect";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = concat!("location-relay/", env!("CARGO_PKG_VERSION"));

// ============================================
// SERVER CONSTANTS
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Largest `/send-email` body read; anything bigger is treated as empty
pub const MAX_SHARE_BODY_BYTES: usize = 16 * 1024;

/// Origins allowed when `ALLOWED_ORIGINS` is not set (local development)
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://127.0.0.1:5000", "http://localhost:5000"];

// ============================================
// DISPATCH CONSTANTS
// ============================================

/// Upper bound for one outbound send, SMTP session or API call (seconds)
pub const DISPATCH_TIMEOUT_SECS: u64 = 20;

/// Brevo relay, STARTTLS on 587
pub const DEFAULT_SMTP_HOST: &str = "smtp-relay.brevo.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Transactional email endpoint (bearer auth, JSON body)
pub const DEFAULT_EMAIL_API_URL: &str = "https://api.resend.com/emails";

/// Map search link synthesized when the client sends none
pub const MAP_SEARCH_URL_PREFIX: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Accuracy placeholder when the client sends none
pub const UNKNOWN_ACCURACY: &str = "unknown";

/// Wall-clock format for the `Time:` line of the message
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================
// ENVIRONMENT KEYS
// ============================================

pub const ENV_EMAIL_TRANSPORT: &str = "EMAIL_TRANSPORT";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const ENV_USE_SSL: &str = "USE_SSL";
pub const ENV_EMAIL_API_URL: &str = "EMAIL_API_URL";
pub const ENV_EMAIL_API_KEY: &str = "EMAIL_API_KEY";
pub const ENV_FROM_EMAIL: &str = "FROM_EMAIL";
pub const ENV_TO_EMAIL: &str = "TO_EMAIL";
pub const ENV_APP_NAME: &str = "APP_NAME";
pub const ENV_API_BASE: &str = "API_BASE";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_ALLOWED_ORIGIN_SUFFIXES: &str = "ALLOWED_ORIGIN_SUFFIXES";
pub const ENV_ALLOW_NULL_ORIGIN: &str = "ALLOW_NULL_ORIGIN";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";

/// Build the map search link for a coordinate pair
pub fn map_search_url(latitude: f64, longitude: f64) -> String {
    format!(
        "{}{},{}",
        MAP_SEARCH_URL_PREFIX,
        format_coordinate(latitude),
        format_coordinate(longitude)
    )
}

/// Shortest round-trip rendering of a coordinate: whole numbers keep a
/// trailing `.0`, and exponents below -4 or from 16 up switch to
/// scientific form with a signed two-digit exponent (`1e-07`, `1e+16`).
pub fn format_coordinate(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if value != 0.0 && (exponent < -4 || exponent >= 16) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
    }

    let plain = value.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{}.0", plain)
    }
}
