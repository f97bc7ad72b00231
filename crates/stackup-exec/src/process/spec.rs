use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use stackup_model::{Env, OutputLogConfig};
use tracing::trace;

use crate::ExecError;

/// Description of a process to launch.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Short name used in logs and errors (e.g. `"scheduler"`).
    pub(crate) name: String,
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    /// Added on top of the inherited environment.
    pub(crate) env: Env,
    /// Working directory; `None` inherits the parent's.
    pub(crate) cwd: Option<PathBuf>,
    /// How captured stdout/stderr lines are mirrored into the log.
    pub(crate) log: OutputLogConfig,
    /// Time a signalled process group gets before it is killed.
    pub(crate) stop_grace: Duration,
}

impl ProcessSpec {
    pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(10);

    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            env: Env::new(),
            cwd: None,
            log: OutputLogConfig::default(),
            stop_grace: Self::DEFAULT_STOP_GRACE,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn log(mut self, log: OutputLogConfig) -> Self {
        self.log = log;
        self
    }

    pub fn stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn environment(&self) -> &Env {
        &self.env
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn output_log(&self) -> &OutputLogConfig {
        &self.log
    }

    /// Rules:
    /// - `program` is not empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.program.trim().is_empty() {
            return Err(ExecError::InvalidSpec(format!(
                "program for '{}' is empty",
                self.name
            )));
        }
        Ok(())
    }

    /// Command line as a single string, for logs and error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    pub(crate) fn trace_state(&self) {
        trace!(
            name = %self.name,
            command = %self.command_line(),
            cwd = ?self.cwd,
            env_len = self.env.len(),
            "process spec resolved"
        );
    }

    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for kv in self.env.iter() {
            cmd.env(kv.key(), kv.value());
        }
        cmd
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessSpec(name='{}', cmd='{}', env={}, cwd={:?})",
            self.name,
            self.command_line(),
            self.env.len(),
            self.cwd,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_arguments_in_order() {
        let spec = ProcessSpec::new("registry", "bindle-server")
            .args(["-d", "/tmp/cache"])
            .arg("--unauthenticated");

        assert_eq!(spec.arguments(), ["-d", "/tmp/cache", "--unauthenticated"]);
        assert_eq!(spec.command_line(), "bindle-server -d /tmp/cache --unauthenticated");
    }

    #[test]
    fn validate_rejects_blank_program() {
        let err = ProcessSpec::new("cli", "   ").validate().unwrap_err();
        assert!(matches!(err, ExecError::InvalidSpec(msg) if msg.contains("cli")));
    }

    #[test]
    fn display_is_compact() {
        let spec = ProcessSpec::new("scheduler", "nomad")
            .args(["agent", "-dev"])
            .env(Env::new().with("A", "1"));
        assert_eq!(
            spec.to_string(),
            "ProcessSpec(name='scheduler', cmd='nomad agent -dev', env=1, cwd=None)"
        );
    }
}
