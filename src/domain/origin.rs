//! Origin Policy
//!
//! Decides whether a cross-site caller may use the share endpoint.
//! An origin is normalized to `scheme://host[:port]` (lowercase, no path,
//! `https` assumed when the scheme is missing) and then matched against:
//! - the literal `null` token, only when explicitly enabled
//! - the exact allow-list
//! - the allowed host suffixes (e.g. `.vercel.app` for preview deployments)

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, warn};

/// Origin sent by sandboxed frames and `file://` pages
pub const NULL_ORIGIN: &str = "null";

/// Normalize an origin or URL to `scheme://host[:port]`.
///
/// Returns `None` when nothing usable remains (blank input, empty host).
pub fn normalize_origin(raw: &str) -> Option<String> {
    let mut origin = raw.trim().to_lowercase();
    if origin.ends_with('/') {
        origin.pop();
    }
    if origin.is_empty() {
        return None;
    }
    if origin == NULL_ORIGIN {
        return Some(origin);
    }

    let (scheme, rest) = match origin.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() => (scheme, rest),
        Some((_, rest)) => ("https", rest),
        None => ("https", origin.as_str()),
    };

    let authority = rest
        .split(|c: char| matches!(c, '/' | '?' | '#'))
        .next()
        .unwrap_or_default();
    // userinfo never belongs to an origin
    let authority = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);
    if authority.is_empty() {
        return None;
    }

    Some(format!("{}://{}", scheme, authority))
}

/// Normalize a configured host suffix
pub fn normalize_suffix(raw: &str) -> Option<String> {
    let suffix = raw.trim().to_lowercase();
    (!suffix.is_empty()).then_some(suffix)
}

/// Host part of a normalized origin, port excluded
pub fn origin_host(origin: &str) -> &str {
    let authority = origin.split_once("://").map(|(_, a)| a).unwrap_or(origin);

    // [v6]:port
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    }
}

/// Immutable allow-list, built once from configuration
#[derive(Debug, Clone, Default)]
pub struct OriginAllowList {
    origins: BTreeSet<String>,
    suffixes: BTreeSet<String>,
    allow_null: bool,
}

impl OriginAllowList {
    /// Entries are expected to be normalized already (see [`normalize_origin`])
    pub fn new(origins: BTreeSet<String>, suffixes: BTreeSet<String>, allow_null: bool) -> Self {
        Self {
            origins,
            suffixes,
            allow_null,
        }
    }

    pub fn origins(&self) -> &BTreeSet<String> {
        &self.origins
    }

    pub fn suffixes(&self) -> &BTreeSet<String> {
        &self.suffixes
    }

    pub fn allow_null(&self) -> bool {
        self.allow_null
    }
}

/// Outcome of an origin check, with the rule that matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    /// No Origin header: same-origin or non-browser caller
    Absent,
    /// Literal `null`, allowed by configuration
    NullOrigin,
    /// Exact allow-list entry
    Exact(String),
    /// Host ends with this configured suffix
    Suffix(String),
    /// Not allowed; carries the normalized origin
    Denied(String),
}

impl OriginDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Denied(_))
    }
}

impl fmt::Display for OriginDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::NullOrigin => f.write_str("null-origin"),
            Self::Exact(origin) => write!(f, "exact:{}", origin),
            Self::Suffix(suffix) => write!(f, "suffix:{}", suffix),
            Self::Denied(_) => f.write_str("denied"),
        }
    }
}

/// Origin gate shared by the CORS middleware and the request gate
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_list: OriginAllowList,
}

impl OriginPolicy {
    pub fn new(allow_list: OriginAllowList) -> Self {
        Self { allow_list }
    }

    pub fn allow_list(&self) -> &OriginAllowList {
        &self.allow_list
    }

    /// Pure evaluation, no logging
    pub fn evaluate(&self, origin: Option<&str>) -> OriginDecision {
        let raw = match origin {
            Some(raw) if !raw.is_empty() => raw,
            _ => return OriginDecision::Absent,
        };

        let Some(normalized) = normalize_origin(raw) else {
            return OriginDecision::Denied(raw.trim().to_string());
        };

        if normalized == NULL_ORIGIN {
            return if self.allow_list.allow_null {
                OriginDecision::NullOrigin
            } else {
                OriginDecision::Denied(normalized)
            };
        }

        if self.allow_list.origins.contains(&normalized) {
            return OriginDecision::Exact(normalized);
        }

        let host = origin_host(&normalized);
        if !host.is_empty() {
            if let Some(suffix) = self
                .allow_list
                .suffixes
                .iter()
                .find(|suffix| host.ends_with(suffix.as_str()))
            {
                return OriginDecision::Suffix(suffix.clone());
            }
        }

        OriginDecision::Denied(normalized)
    }

    /// Evaluate and record the decision
    pub fn is_allowed(&self, origin: Option<&str>) -> bool {
        let decision = self.evaluate(origin);
        let shown = origin.unwrap_or_default();
        if decision.is_allowed() {
            debug!(origin = %shown, rule = %decision, "Origin allowed");
        } else {
            warn!(origin = %shown, rule = %decision, "🚫 Origin rejected");
        }
        decision.is_allowed()
    }
}
