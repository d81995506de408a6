use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulates outbound request volume for connector usage reporting
#[derive(Debug, Default)]
pub struct UsageCollector {
    requests: AtomicU64,
    request_body_bytes: AtomicU64,
}

/// Point-in-time copy of a [`UsageCollector`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UsageSnapshot {
    /// Requests sent, including retries
    pub requests: u64,
    /// Serialized request body bytes sent
    pub request_body_bytes: u64,
}

impl UsageCollector {
    /// Collector with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one outbound request with a body of `body_bytes` bytes
    pub fn record_request(&self, body_bytes: u64) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.request_body_bytes
            .fetch_add(body_bytes, Ordering::Relaxed);
    }

    /// Current counter values
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            request_body_bytes: self.request_body_bytes.load(Ordering::Relaxed),
        }
    }
}
