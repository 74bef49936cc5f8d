//! Error types for retry configuration and transport failures.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::fmt;

/// Invalid retry configuration, reported when a wrapper or policy is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The setting was present but was not an integer.
    TypeMismatch {
        name: &'static str,
        found: &'static str,
    },
    /// The setting was an integer outside the accepted range.
    InvalidValue {
        name: &'static str,
        expected: String,
        value: String,
    },
}

impl ConfigError {
    /// Name of the offending setting.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigError::TypeMismatch { name, .. } | ConfigError::InvalidValue { name, .. } => {
                name
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TypeMismatch { name, found } => {
                write!(f, "{} should be an int, found {}", name, found)
            }
            ConfigError::InvalidValue {
                name,
                expected,
                value,
            } => {
                write!(f, "{} should be {} but was '{}'", name, expected, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A failed REST call as reported by a transport.
///
/// Carries the HTTP status and response headers when the server answered, so
/// callers (and the retry wrappers) can tell a rate limit apart from other
/// failures. Connection-level failures have no status and keep their cause as
/// [`std::error::Error::source`].
#[derive(Debug)]
pub struct ApiError {
    status: Option<StatusCode>,
    reason: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    source: Option<anyhow::Error>,
}

impl ApiError {
    pub fn new(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            reason: reason.into(),
            headers: HeaderMap::new(),
            body: None,
            source: None,
        }
    }

    /// Builds an error from a non-success HTTP response.
    pub fn from_response(status: StatusCode, headers: HeaderMap, body: Option<Vec<u8>>) -> Self {
        Self {
            status: Some(status),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers,
            body,
            source: None,
        }
    }

    /// Builds an error for a request that never produced an HTTP response.
    pub fn transport(error: impl Into<anyhow::Error>) -> Self {
        let error = error.into();
        Self {
            status: None,
            reason: format!("{:#}", error),
            headers: HeaderMap::new(),
            body: None,
            source: Some(error),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {} error: {}", status.as_u16(), self.reason),
            None => write!(f, "Request error: {}", self.reason),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
