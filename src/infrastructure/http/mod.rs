//! reqwest implementation of the HTTP transport port.

pub mod client;
pub mod rate_limiter;
pub mod retry;
pub mod usage;

pub use client::{ReqwestTransport, ReqwestTransportConfig, TransportAuth};
pub use rate_limiter::TokenBucketRateLimiter;
pub use retry::RetryPolicy;
pub use usage::{UsageCollector, UsageSnapshot};
