//! Call tracking via the UsageSink trait.
//!
//! Every request the gateway sends is reported to a sink, so callers decide
//! whether calls are logged, collected, or dropped:
//! - the CLI uses TracingUsageSink (visible with RUST_LOG=debug)
//! - tests use NoopUsageSink or a collecting sink

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Status of a service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Success => "success",
            CallStatus::Error => "error",
        }
    }
}

/// Record of one call to the assistant service.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// Local id, so log lines from one call can be correlated.
    pub call_id: Uuid,
    /// Logical endpoint, e.g. "threads.runs.retrieve".
    pub endpoint: &'static str,
    pub status: CallStatus,
    /// HTTP status, when a response was received.
    pub http_status: Option<u16>,
    /// Error code if status is Error.
    pub error_code: Option<&'static str>,
    /// Service request ID (for debugging).
    pub request_id: Option<String>,
    pub latency: Duration,
    /// When the call was made.
    pub timestamp: DateTime<Utc>,
}

impl CallRecord {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            call_id: Uuid::new_v4(),
            endpoint,
            status: CallStatus::Success,
            http_status: None,
            error_code: None,
            request_id: None,
            latency: Duration::ZERO,
            timestamp: Utc::now(),
        }
    }

    pub fn http_status(mut self, status: Option<u16>) -> Self {
        self.http_status = status;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn request_id(mut self, id: Option<String>) -> Self {
        self.request_id = id;
        self
    }

    pub fn error(mut self, code: &'static str) -> Self {
        self.status = CallStatus::Error;
        self.error_code = Some(code);
        self
    }
}

/// Trait for recording service calls.
#[async_trait]
pub trait UsageSink: Send + Sync {
    /// Record a call. Fire-and-forget: failures should be logged, not propagated.
    async fn record(&self, record: CallRecord);
}

/// Discards all records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageSink;

#[async_trait]
impl UsageSink for NoopUsageSink {
    async fn record(&self, _record: CallRecord) {}
}

/// Emits each record as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingUsageSink;

#[async_trait]
impl UsageSink for TracingUsageSink {
    async fn record(&self, record: CallRecord) {
        tracing::debug!(
            call_id = %record.call_id,
            endpoint = record.endpoint,
            status = record.status.as_str(),
            http_status = record.http_status,
            error_code = record.error_code,
            request_id = record.request_id.as_deref(),
            latency_ms = record.latency.as_millis() as u64,
            timestamp = %record.timestamp,
            "assistant call"
        );
    }
}
