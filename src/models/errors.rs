//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so logs and API responses can be
//! correlated. Codes follow the pattern CATEGORY_SPECIFIC_ERROR:
//! - ORIGIN_xxx: origin policy rejections
//! - VALIDATION_xxx: client payload errors
//! - CFG_xxx: operator configuration errors detected at send time
//! - TRANSPORT_xxx / REMOTE_xxx: delivery failures

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message, surfaced verbatim to the caller
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// HTTP status for the `{ok:false}` response
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Policy Rejections
    // ============================================
    /// Declared origin is not on the allow-list
    OriginNotAllowed,

    // ============================================
    // Validation Errors
    // ============================================
    /// `consent` was not exactly `true`
    ConsentRequired,
    /// `lat`/`lng` missing, non-numeric or not finite
    InvalidCoordinates,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Transport credentials not set
    ConfigMissingCredentials,
    /// Sender or recipient address not set
    ConfigMissingAddress,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Transport Errors
    // ============================================
    /// Could not connect to the relay or API host
    TransportConnectionFailed,
    /// Send did not complete within the dispatch timeout
    TransportTimeout,
    /// TLS handshake or STARTTLS upgrade failed
    TransportTls,
    /// Relay refused the session (authentication, sender, recipient)
    TransportRejected,
    /// Email API answered with HTTP status >= 400
    RemoteApiError,
    /// Any other delivery failure
    TransportFailed,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OriginNotAllowed => "ORIGIN_NOT_ALLOWED",

            Self::ConsentRequired => "VALIDATION_CONSENT_REQUIRED",
            Self::InvalidCoordinates => "VALIDATION_INVALID_COORDINATES",

            Self::ConfigMissingCredentials => "CFG_MISSING_CREDENTIALS",
            Self::ConfigMissingAddress => "CFG_MISSING_ADDRESS",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::TransportConnectionFailed => "TRANSPORT_CONNECTION_FAILED",
            Self::TransportTimeout => "TRANSPORT_TIMEOUT",
            Self::TransportTls => "TRANSPORT_TLS",
            Self::TransportRejected => "TRANSPORT_REJECTED",
            Self::RemoteApiError => "REMOTE_API_ERROR",
            Self::TransportFailed => "TRANSPORT_FAILED",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::OriginNotAllowed => 403,
            Self::ConsentRequired | Self::InvalidCoordinates => 400,
            _ => 500,
        }
    }

    /// Whether a client may resubmit the same request unchanged.
    /// The service itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportConnectionFailed | Self::TransportTimeout | Self::RemoteApiError
        )
    }

    /// Operator must fix configuration; the client cannot
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::ConfigMissingCredentials | Self::ConfigMissingAddress | Self::ConfigInvalidValue
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Origin rejected by the allow-list
    pub fn origin_not_allowed(origin: Option<&str>) -> Self {
        let shown = match origin {
            Some(o) if !o.is_empty() => o,
            _ => "(none)",
        };
        Self::new(
            ErrorCode::OriginNotAllowed,
            format!("Origin not allowed: {}", shown),
        )
    }

    /// Consent missing or not boolean `true`
    pub fn consent_required() -> Self {
        Self::new(ErrorCode::ConsentRequired, "Consent is required")
    }

    /// Coordinates missing or unparseable
    pub fn invalid_coordinates() -> Self {
        Self::new(ErrorCode::InvalidCoordinates, "Missing or invalid coordinates")
    }

    /// Transport credentials missing
    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissingCredentials, msg)
    }

    /// Sender/recipient missing
    pub fn missing_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissingAddress, msg)
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Email API error response; the body is kept verbatim
    pub fn remote_api(body: impl Into<String>) -> Self {
        Self::new(ErrorCode::RemoteApiError, body)
    }

    /// Generic transport failure
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportFailed, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::TransportTimeout
        } else if err.is_connect() {
            ErrorCode::TransportConnectionFailed
        } else {
            ErrorCode::TransportFailed
        };
        Self::with_source(code, err.to_string(), err)
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::TransportTimeout
        } else if err.is_tls() {
            ErrorCode::TransportTls
        } else if err.is_permanent() || err.is_transient() {
            // The relay answered with a 4xx/5xx reply (auth, sender, recipient)
            ErrorCode::TransportRejected
        } else if err.is_client() {
            ErrorCode::TransportFailed
        } else {
            ErrorCode::TransportConnectionFailed
        };
        Self::with_source(code, err.to_string(), err)
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        Self::with_source(ErrorCode::ConfigInvalidValue, err.to_string(), err)
    }
}

impl From<lettre::address::AddressError> for AppError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::with_source(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid email address: {}", err),
            err,
        )
    }
}
