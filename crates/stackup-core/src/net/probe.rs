//! TCP readiness probing.
use std::{fmt, time::Duration};

use stackup_model::ReadinessPolicy;
use thiserror::Error;
use tokio::{
    net::TcpStream,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Why a probe gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutCause {
    Deadline,
    Canceled,
}

impl fmt::Display for TimeoutCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimeoutCause::Deadline => "deadline exceeded",
            TimeoutCause::Canceled => "canceled",
        })
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timeout waiting for tcp on {address} after {waited:?} ({cause})")]
    Timeout {
        address: String,
        waited: Duration,
        cause: TimeoutCause,
    },
}

impl ProbeError {
    pub fn cause(&self) -> TimeoutCause {
        match self {
            ProbeError::Timeout { cause, .. } => *cause,
        }
    }
}

/// Poll `address` until a TCP connection is accepted.
///
/// Connects on every tick of `policy.interval()`, the first tick being
/// immediate. Failed attempts are logged and retried without backoff. Each
/// attempt is itself bounded by the interval, so neither the deadline nor a
/// cancellation is overshot by more than one tick.
pub async fn wait_ready(
    address: &str,
    policy: &ReadinessPolicy,
    cancel: &CancellationToken,
) -> Result<(), ProbeError> {
    let started = Instant::now();
    let deadline = tokio::time::sleep(policy.timeout());
    tokio::pin!(deadline);

    let mut ticker = tokio::time::interval(policy.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let give_up = |cause| ProbeError::Timeout {
        address: address.to_string(),
        waited: started.elapsed(),
        cause,
    };

    let mut attempt: u32 = 0;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(give_up(TimeoutCause::Canceled)),
            _ = &mut deadline => return Err(give_up(TimeoutCause::Deadline)),
            _ = ticker.tick() => {
                attempt += 1;
                match tokio::time::timeout(policy.interval(), TcpStream::connect(address)).await {
                    Ok(Ok(_stream)) => {
                        debug!(%address, attempt, elapsed = ?started.elapsed(), "tcp endpoint is reachable");
                        return Ok(());
                    }
                    Ok(Err(e)) => error!(%address, attempt, "tcp endpoint not reachable: {e}"),
                    Err(_) => error!(%address, attempt, "tcp connect attempt timed out"),
                }
            }
        }
    }
}
