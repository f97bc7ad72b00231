use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ModelError, TimeoutMs};

/// Bounded wait applied to every readiness probe.
///
/// A probe ticks every `interval_ms` and gives up after `timeout_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReadinessPolicy {
    pub timeout_ms: TimeoutMs,
    pub interval_ms: TimeoutMs,
}

impl ReadinessPolicy {
    pub const DEFAULT_TIMEOUT_MS: TimeoutMs = 30_000;
    pub const DEFAULT_INTERVAL_MS: TimeoutMs = 1_000;

    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout_ms: timeout.as_millis() as TimeoutMs,
            interval_ms: interval.as_millis() as TimeoutMs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Rules:
    /// - both values are non-zero;
    /// - the interval fits inside the timeout.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.timeout_ms == 0 {
            return Err(ModelError::Invalid("readiness.timeoutMs cannot be zero".into()));
        }
        if self.interval_ms == 0 {
            return Err(ModelError::Invalid("readiness.intervalMs cannot be zero".into()));
        }
        if self.interval_ms > self.timeout_ms {
            return Err(ModelError::Invalid(format!(
                "readiness.intervalMs ({}) exceeds readiness.timeoutMs ({})",
                self.interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            interval_ms: Self::DEFAULT_INTERVAL_MS,
        }
    }
}
