use crate::error::{ApiError, ConfigError};
use crate::policy::RetryPolicy;
use crate::request::{RestRequest, RestResponse};
use crate::sleep::{Sleep, ThreadSleep};
use crate::transport::RestTransport;

use super::{AttemptState, next_delay};

/// Blocking retry decorator for a [`RestTransport`].
///
/// The calling thread sleeps through rate-limit delays. Counters are local to
/// each call, so one wrapper can be shared between threads as long as the
/// transport can.
#[derive(Debug, Clone)]
pub struct RetryingRestWrapper<T, S = ThreadSleep> {
    transport: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: RestTransport> RetryingRestWrapper<T> {
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
        Self::with_sleep(transport, policy, ThreadSleep)
    }
}

impl<T: RestTransport, S: Sleep> RetryingRestWrapper<T, S> {
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
    pub fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        let mut state = AttemptState::new();

        loop {
            let error = match self.transport.request(request) {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let Some(delay) = next_delay(&mut state, &self.policy, &error) else {
                return Err(error);
            };
            if !delay.is_zero() {
                self.sleeper.sleep(delay);
            }
        }
    }
}

impl<T: RestTransport, S: Sleep> RestTransport for RetryingRestWrapper<T, S> {
    fn request(&self, request: &RestRequest) -> Result<RestResponse, ApiError> {
        RetryingRestWrapper::request(self, request)
    }
}
