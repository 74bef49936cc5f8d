//! `reqwest`-backed transports.
//!
//! These adapt a `reqwest` client to [`AsyncRestTransport`] and
//! [`RestTransport`]. A response outside the 2xx range becomes an [`ApiError`]
//! carrying its status, headers and body; a request that never got a response
//! becomes an [`ApiError`] with no status.
//!
//! With `preload_content` off, a successful response comes back with
//! `data: None`. The body is never read and the connection is released once
//! the status and headers are in; there is no handle to stream it later.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, blocking};

use crate::error::ApiError;
use crate::request::{FileUpload, RestRequest, RestResponse};
use crate::transport::{AsyncRestTransport, RestTransport};

/// How the request body is encoded on the wire.
enum Payload<'a> {
    Multipart {
        fields: &'a [(String, String)],
        files: &'a [FileUpload],
    },
    Form(&'a [(String, String)]),
    Json(&'a serde_json::Value),
    Empty,
}

impl<'a> Payload<'a> {
    fn of(request: &'a RestRequest) -> Self {
        if !request.files.is_empty() {
            Payload::Multipart {
                fields: &request.post_params,
                files: &request.files,
            }
        } else if !request.post_params.is_empty() {
            Payload::Form(&request.post_params)
        } else if let Some(body) = &request.body {
            Payload::Json(body)
        } else {
            Payload::Empty
        }
    }
}

/// Assembles a request builder from a [`RestRequest`].
///
/// The async and blocking reqwest builders expose the same methods but share no
/// trait, so the assembly is written once here and expanded for each, with the
/// matching multipart `Form` and `Part` types.
macro_rules! build_request {
    ($client:expr, $request:expr, $form:ty, $part:ty) => {{
        let request: &RestRequest = $request;
        let mut builder = $client
            .request(request.method.clone(), request.url.as_str())
            .headers(request.headers.clone());

        if !request.query_params.is_empty() {
            builder = builder.query(&request.query_params);
        }
        if let Some(timeout) = request.request_timeout {
            builder = builder.timeout(timeout);
        }

        builder = match Payload::of(request) {
            Payload::Multipart { fields, files } => {
                let mut form = <$form>::new();
                for (key, value) in fields {
                    form = form.text(key.clone(), value.clone());
                }
                for file in files {
                    let mut part =
                        <$part>::bytes(file.content.clone()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime_type {
                        part = part
                            .mime_str(mime)
                            .with_context(|| format!("Invalid MIME type for {}", file.file_name))?;
                    }
                    form = form.part(file.field_name.clone(), part);
                }
                builder.multipart(form)
            }
            Payload::Form(fields) => builder.form(fields),
            Payload::Json(body) => builder.json(body),
            Payload::Empty => builder,
        };

        Ok(builder)
    }};
}

/// Async transport over a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn build(&self, request: &RestRequest) -> Result<reqwest::RequestBuilder> {
        build_request!(
            self.client,
            request,
            reqwest::multipart::Form,
            reqwest::multipart::Part
        )
    }
}

#[async_trait]
impl AsyncRestTransport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        debug!("{} {}...", request.method, request.url);

        let response = self
            .build(request)
            .map_err(ApiError::transport)?
            .send()
            .await
            .map_err(|e| {
                ApiError::transport(anyhow::Error::from(e).context("Failed to send request"))
            })?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.bytes().await.ok().map(|b| b.to_vec());
            debug!("{} {} returned HTTP {}", request.method, request.url, status);
            return Err(ApiError::from_response(status, headers, body));
        }

        let data = if request.preload_content {
            let bytes = response
                .bytes()
                .await
                .context("Failed to read response body")
                .map_err(ApiError::transport)?;
            Some(bytes.to_vec())
        } else {
            None
        };

        Ok(RestResponse::new(status, headers, data))
    }
}

/// Blocking transport over a [`reqwest::blocking::Client`].
///
/// Must not be created or used from inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingReqwestTransport {
    client: blocking::Client,
}

impl BlockingReqwestTransport {
    pub fn new(client: blocking::Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest blocking Client.
    pub fn inner(&self) -> &blocking::Client {
        &self.client
    }

    fn build(&self, request: &RestRequest) -> Result<blocking::RequestBuilder> {
        build_request!(
            self.client,
            request,
            blocking::multipart::Form,
            blocking::multipart::Part
        )
    }
}

impl RestTransport for BlockingReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        debug!("{} {}...", request.method, request.url);

        let response = self
            .build(request)
            .map_err(ApiError::transport)?
            .send()
            .map_err(|e| {
                ApiError::transport(anyhow::Error::from(e).context("Failed to send request"))
            })?;

        let status = response.status();
        let headers = response.headers().clone();

        if !status.is_success() {
            let body = response.bytes().ok().map(|b| b.to_vec());
            debug!("{} {} returned HTTP {}", request.method, request.url, status);
            return Err(ApiError::from_response(status, headers, body));
        }

        let data = if request.preload_content {
            let bytes = response
                .bytes()
                .context("Failed to read response body")
                .map_err(ApiError::transport)?;
            Some(bytes.to_vec())
        } else {
            None
        };

        Ok(RestResponse::new(status, headers, data))
    }
}
