//! HTTP transports and failure classification.

mod client;
pub mod retry;

pub use client::{BlockingReqwestTransport, ReqwestTransport};
pub use retry::{DEFAULT_RATE_LIMIT_DELAY, FailureKind, classify, parse_retry_after};
