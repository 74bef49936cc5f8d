use async_trait::async_trait;

use crate::error::{ApiError, ConfigError};
use crate::policy::RetryPolicy;
use crate::request::{RestRequest, RestResponse};
use crate::sleep::{AsyncSleep, TokioSleep};
use crate::transport::AsyncRestTransport;

use super::{AttemptState, next_delay};

/// Async retry decorator for an [`AsyncRestTransport`].
///
/// Each attempt is awaited to completion before the next decision, so a call
/// never has two requests in flight. Rate-limit delays suspend only the
/// calling task. Dropping the returned future stops the loop where it is:
/// the pending attempt or timer is dropped and nothing further is sent.
#[derive(Debug, Clone)]
pub struct RetryingRestWrapperAsync<T, S = TokioSleep> {
    transport: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: AsyncRestTransport> RetryingRestWrapperAsync<T> {
    /// Wraps `transport`, validating the optional budgets.
    pub fn new(
        transport: T,
        retries: Option<i64>,
        rate_limit_retries: Option<i64>,
    ) -> Result<Self, ConfigError> {
        let policy = RetryPolicy::new(retries, rate_limit_retries)?;
        Ok(Self::with_policy(transport, policy))
    }

    pub fn with_policy(transport: T, policy: RetryPolicy) -> Self {
        Self::with_sleep(transport, policy, TokioSleep)
    }
}

impl<T: AsyncRestTransport, S: AsyncSleep> RetryingRestWrapperAsync<T, S> {
    pub fn with_sleep(transport: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns a reference to the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.transport
    }

    /// Issues `request`, retrying failures within the policy's budgets.
    ///
    /// The final failure is returned exactly as the transport reported it.
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    pub async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        let mut state = AttemptState::new();

        loop {
            let error = match self.transport.request(request).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let Some(delay) = next_delay(&mut state, &self.policy, &error) else {
                return Err(error);
            };
            if !delay.is_zero() {
                self.sleeper.sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl<T: AsyncRestTransport, S: AsyncSleep> AsyncRestTransport for RetryingRestWrapperAsync<T, S> {
    async fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        RetryingRestWrapperAsync::request(self, request).await
    }
}
