//! Retry decorators for the REST transport of a generated API SDK.
//!
//! [`RetryingRestWrapper`] (blocking) and [`RetryingRestWrapperAsync`] (tokio)
//! wrap a transport and re-issue failed requests under a [`RetryPolicy`]:
//! rate-limited responses (HTTP 429) wait for their `Retry-After` hint,
//! everything else is retried immediately, each against its own budget.
//!
//! ```no_run
//! use rest_retry::{ReqwestTransport, RestRequest, RetryingRestWrapperAsync};
//! use reqwest::Method;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let transport = ReqwestTransport::new(reqwest::Client::new());
//! let client = RetryingRestWrapperAsync::new(transport, Some(2), Some(5))?;
//!
//! let request = RestRequest::new(Method::GET, "https://api.example.com/v1/items");
//! let response = client.request(&request).await?;
//! println!("{:?}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod policy;
pub mod request;
pub mod sleep;
pub mod transport;
pub mod wrapper;

pub use error::{ApiError, ConfigError};
pub use http::{BlockingReqwestTransport, DEFAULT_RATE_LIMIT_DELAY, FailureKind, ReqwestTransport};
pub use policy::{DEFAULT_MAX_RATE_LIMIT_RETRIES, DEFAULT_MAX_RETRIES, RetryPolicy};
pub use request::{FileUpload, RestRequest, RestResponse};
pub use sleep::{AsyncSleep, Sleep, ThreadSleep, TokioSleep};
pub use transport::{AsyncRestTransport, RestTransport};
pub use wrapper::{AttemptState, RetryingRestWrapper, RetryingRestWrapperAsync};

/// Shared fixtures for unit tests.
#[cfg(test)]
pub mod test_utils {
    use crate::error::ApiError;
    use crate::request::{FileUpload, RestRequest, RestResponse};
    use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
    use reqwest::{Method, StatusCode};
    use serde_json::json;
    use std::time::Duration;

    /// A request with every passthrough argument set to a non-default value.
    pub fn sample_request() -> RestRequest {
        RestRequest::new(Method::POST, "https://api.example.com/v1/items")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer token"))
            .with_query("dry_run", "false")
            .with_post_param("name", "widget")
            .with_body(json!({"name": "widget"}))
            .with_file(FileUpload::new("attachment", "notes.txt", "contents"))
            .with_preload_content(false)
            .with_timeout(Duration::from_secs(30))
            .with_option("request_auth", json!({"in": "header"}))
    }

    pub fn ok_response() -> RestResponse {
        RestResponse::new(StatusCode::OK, HeaderMap::new(), Some(b"OK".to_vec()))
    }

    pub fn generic_error(reason: &str) -> ApiError {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, reason)
    }

    /// A 429 error, with `Retry-After` set to `retry_after` when given.
    pub fn rate_limited(retry_after: Option<&'static str>) -> ApiError {
        let mut headers = HeaderMap::new();
        if let Some(value) = retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
        }
        ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").with_headers(headers)
    }
}
