use serde::{Deserialize, Serialize};

use crate::ModelError;

/// How captured process output is mirrored into the log.
///
/// Capture itself is unconditional; this only decides log level and width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputLogConfig {
    /// Longer lines are truncated in the log (the buffer keeps them whole).
    pub max_line_length: usize,
    /// Log stdout at INFO level (false = DEBUG).
    pub stdout_info: bool,
    /// Log stderr at WARN level (false = DEBUG).
    pub stderr_warn: bool,
}

impl Default for OutputLogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            stdout_info: false,
            stderr_warn: false,
        }
    }
}

impl OutputLogConfig {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.max_line_length == 0 {
            return Err(ModelError::Invalid("output.maxLineLength cannot be zero".into()));
        }
        Ok(())
    }
}
