//! Transport abstraction wrapped by the retry decorators.
//!
//! A transport issues one REST call and reports either the response or an
//! [`ApiError`]. The blocking and async flavours share the same contract; the
//! retry wrappers implement the same trait they wrap, so they can stand in for
//! the transport anywhere.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ApiError;
use crate::request::{RestRequest, RestResponse};

#[cfg_attr(test, mockall::automock)]
pub trait RestTransport: Send + Sync {
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AsyncRestTransport: Send + Sync {
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError>;
}

impl<T: RestTransport + ?Sized> RestTransport for &T {
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request)
    }
}

impl<T: RestTransport + ?Sized> RestTransport for Arc<T> {
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request)
    }
}

impl<T: RestTransport + ?Sized> RestTransport for Box<T> {
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request)
    }
}

#[async_trait]
impl<'a, T: AsyncRestTransport + ?Sized> AsyncRestTransport for &'a T {
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request).await
    }
}

#[async_trait]
impl<T: AsyncRestTransport + ?Sized> AsyncRestTransport for Arc<T> {
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request).await
    }
}

#[async_trait]
impl<T: AsyncRestTransport + ?Sized> AsyncRestTransport for Box<T> {
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        (**self).request(request).await
    }
}
