//! Failure classification and rate-limit delays.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::fmt;
use std::time::Duration;

use crate::error::ApiError;

/// Delay before retrying a rate-limited request whose `Retry-After` header is
/// missing or unreadable.
pub const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(1);

/// How the retry loop should treat a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429, with the server's `Retry-After` hint if it sent a usable one.
    RateLimited { retry_after: Option<Duration> },
    /// Any other failure, including connection errors.
    Generic,
}

impl FailureKind {
    /// Pause before the next attempt.
    pub fn delay(&self) -> Duration {
        match self {
            FailureKind::RateLimited { retry_after } => {
                retry_after.unwrap_or(DEFAULT_RATE_LIMIT_DELAY)
            }
            FailureKind::Generic => Duration::ZERO,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RateLimited { .. } => write!(f, "rate-limited"),
            FailureKind::Generic => write!(f, "generic"),
        }
    }
}

/// Classifies a transport failure for the retry loop.
pub fn classify(error: &ApiError) -> FailureKind {
    match error.status() {
        Some(StatusCode::TOO_MANY_REQUESTS) => FailureKind::RateLimited {
            retry_after: parse_retry_after(error.headers()),
        },
        _ => FailureKind::Generic,
    }
}

/// Reads `Retry-After` as a number of seconds.
///
/// Fractional values are accepted. Negative, non-finite and non-numeric values
/// (including HTTP dates) yield `None`.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let seconds: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers_with_retry_after(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_parse_retry_after_seconds() {
        assert_eq!(
            parse_retry_after(&headers_with_retry_after("1")),
            Some(Duration::from_secs(1))
        );
        assert_eq!(
            parse_retry_after(&headers_with_retry_after(" 120 ")),
            Some(Duration::from_secs(120))
        );
        assert_eq!(
            parse_retry_after(&headers_with_retry_after("0.5")),
            Some(Duration::from_millis(500))
        );
        assert_eq!(
            parse_retry_after(&headers_with_retry_after("0")),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn test_parse_retry_after_rejects_garbage() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
        assert_eq!(parse_retry_after(&headers_with_retry_after("soon")), None);
        assert_eq!(parse_retry_after(&headers_with_retry_after("-3")), None);
        assert_eq!(parse_retry_after(&headers_with_retry_after("inf")), None);
        assert_eq!(parse_retry_after(&headers_with_retry_after("NaN")), None);
        assert_eq!(
            parse_retry_after(&headers_with_retry_after("Wed, 21 Oct 2015 07:28:00 GMT")),
            None
        );
    }

    #[test]
    fn test_classify_too_many_requests() {
        let err = ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests")
            .with_headers(headers_with_retry_after("2"));
        assert_eq!(
            classify(&err),
            FailureKind::RateLimited {
                retry_after: Some(Duration::from_secs(2))
            }
        );
    }

    #[test]
    fn test_classify_too_many_requests_without_hint() {
        let err = ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests");
        let kind = classify(&err);
        assert_eq!(kind, FailureKind::RateLimited { retry_after: None });
        assert_eq!(kind.delay(), DEFAULT_RATE_LIMIT_DELAY);
    }

    #[test]
    fn test_classify_other_statuses_are_generic() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::NOT_FOUND,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            // Retry-After on a non-429 response does not make it a rate limit
            let err = ApiError::new(status, "nope").with_headers(headers_with_retry_after("5"));
            assert_eq!(classify(&err), FailureKind::Generic);
        }
    }

    #[test]
    fn test_classify_connection_error_is_generic() {
        let err = ApiError::transport(anyhow::anyhow!("connection refused"));
        let kind = classify(&err);
        assert_eq!(kind, FailureKind::Generic);
        assert_eq!(kind.delay(), Duration::ZERO);
    }

    #[test]
    fn test_failure_kind_display() {
        assert_eq!(FailureKind::Generic.to_string(), "generic");
        assert_eq!(
            FailureKind::RateLimited { retry_after: None }.to_string(),
            "rate-limited"
        );
    }

    #[tokio::test]
    async fn test_classify_error_from_server_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .with_status(429)
            .with_header("Retry-After", "3")
            .create_async()
            .await;

        let response = reqwest::Client::new().get(server.url()).send().await.unwrap();
        let err = ApiError::from_response(response.status(), response.headers().clone(), None);

        assert_eq!(
            classify(&err),
            FailureKind::RateLimited {
                retry_after: Some(Duration::from_secs(3))
            }
        );
    }
}
