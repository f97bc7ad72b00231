use std::{fmt, path::PathBuf};

use stackup_exec::ExecError;
use stackup_model::ModelError;
use thiserror::Error;

use crate::net::ProbeError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no free local port: {0}")]
    Allocation(#[source] std::io::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Readiness(#[from] ProbeError),

    #[error("account bootstrap failed: expected 200, got {status}: {body}")]
    Bootstrap { status: u16, body: String },

    #[error("bootstrap request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ModelError),

    #[error("{0} is not running")]
    NotReady(&'static str),

    #[error("metadata extraction for '{app}' failed: {reason}")]
    Extract { app: String, reason: String },
}

/// One failed step of a teardown sweep.
#[derive(Debug, Error)]
pub enum TeardownCause {
    #[error("failed to stop {service}: {source}")]
    Stop {
        service: &'static str,
        #[source]
        source: ExecError,
    },

    #[error("failed to remove scratch directory {} of {service}: {source}", .path.display())]
    Cleanup {
        service: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every failure collected by a teardown, in the order they happened.
#[derive(Debug, Default)]
pub struct TeardownError {
    causes: Vec<TeardownCause>,
}

impl TeardownError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cause: TeardownCause) {
        self.causes.push(cause);
    }

    pub fn causes(&self) -> &[TeardownCause] {
        &self.causes
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    /// `Ok(())` when nothing failed.
    pub fn into_result(self) -> Result<(), TeardownError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cause in &self.causes {
            writeln!(f, "{cause}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TeardownError {}
