//! Request and response values exchanged with a REST transport.

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::time::Duration;

/// A file sent as one part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub field_name: String,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: Option<String>,
}

impl FileUpload {
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content: content.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Everything a transport needs to issue one REST call.
///
/// Retry wrappers hand the same `&RestRequest` to every attempt, so all of
/// these arguments reach the transport unchanged each time.
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub query_params: Vec<(String, String)>,
    /// Form fields. Sent urlencoded, or as text parts when `files` is not empty.
    pub post_params: Vec<(String, String)>,
    /// JSON body, ignored when `post_params` or `files` are present.
    pub body: Option<Value>,
    pub files: Vec<FileUpload>,
    /// Whether the transport should read the response body before returning.
    ///
    /// When `false`, the response comes back with `data: None` and the body is
    /// discarded; it cannot be read afterwards. Only status and headers survive.
    pub preload_content: bool,
    pub request_timeout: Option<Duration>,
    /// Transport-specific options, forwarded untouched.
    pub options: Map<String, Value>,
}

impl RestRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            query_params: Vec::new(),
            post_params: Vec::new(),
            body: None,
            files: Vec::new(),
            preload_content: true,
            request_timeout: None,
            options: Map::new(),
        }
    }

    pub fn with_header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    pub fn with_post_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.post_params.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_file(mut self, file: FileUpload) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_preload_content(mut self, preload_content: bool) -> Self {
        self.preload_content = preload_content;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// A successful REST response. Passed through the retry wrappers verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Response body; `None` when the request did not preload content, in
    /// which case the body was never read and is gone.
    pub data: Option<Vec<u8>>,
}

impl RestResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, data: Option<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Body as UTF-8 text, if it was preloaded and is valid UTF-8.
    pub fn text(&self) -> Option<&str> {
        self.data
            .as_deref()
            .and_then(|data| std::str::from_utf8(data).ok())
    }
}
