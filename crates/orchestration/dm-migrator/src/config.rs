//! Configuration for a migration run.

use crate::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default number of concurrent transfer workers.
///
/// Bounded by the store client's safe concurrent-connection budget;
/// unbounded fan-out against the source bucket invites throttling.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Configuration for a [`crate::Migrator`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Number of concurrent transfer workers
    pub concurrency: usize,

    /// Per-worker dispatch channel buffer
    pub channel_buffer: usize,

    /// Time budget for each store operation (fetch, decode, write)
    #[serde(with = "duration_secs")]
    pub operation_timeout: Duration,

    /// Retry policy for throttling-class store errors
    pub retry: RetryConfig,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            channel_buffer: 32,
            operation_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of concurrent transfer workers.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-worker dispatch channel buffer.
    pub fn with_channel_buffer(mut self, size: usize) -> Self {
        self.channel_buffer = size;
        self
    }

    /// Set the per-operation time budget.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.channel_buffer == 0 {
            return Err("channel_buffer must be at least 1".to_string());
        }
        if self.operation_timeout.is_zero() {
            return Err("operation_timeout must be non-zero".to_string());
        }
        Ok(())
    }
}

/// Serde helper for Duration serialization as whole seconds.
mod duration_secs {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
