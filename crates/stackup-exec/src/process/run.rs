use std::process::Stdio;

use tracing::{debug, trace};

use crate::{ExecError, process::spec::ProcessSpec};

/// Captured result of a process that ran to completion successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `spec` to completion, capturing stdout and stderr.
///
/// A non-zero exit (or death by signal) is [`ExecError::NonZeroExit`] carrying
/// both streams. There is no retry.
pub async fn run(spec: &ProcessSpec) -> Result<ProcessOutput, ExecError> {
    spec.validate()?;
    spec.trace_state();

    let command = spec.command_line();
    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null());

    debug!(process = %spec.name, command = %command, "running command");
    let output = cmd.output().await.map_err(|source| ExecError::Spawn {
        command: command.clone(),
        source,
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    trace!(process = %spec.name, %stdout, %stderr, "command output");

    if !output.status.success() {
        return Err(ExecError::NonZeroExit {
            command,
            status: output.status.to_string(),
            code: output.status.code(),
            stdout,
            stderr,
        });
    }

    debug!(process = %spec.name, "command succeeded");
    Ok(ProcessOutput { stdout, stderr })
}

#[cfg(all(test, unix))]
mod tests {
    use stackup_model::Env;

    use super::*;

    #[tokio::test]
    async fn captures_output_of_successful_command() {
        let spec = ProcessSpec::new("echo", "sh").args(["-c", "echo hello; echo warn >&2"]);
        let out = run(&spec).await.unwrap();
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "warn\n");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_code_and_streams() {
        let spec = ProcessSpec::new("fail", "sh").args(["-c", "echo partial; echo boom >&2; exit 3"]);
        let err = run(&spec).await.unwrap_err();

        match &err {
            ExecError::NonZeroExit {
                code, stdout, stderr, ..
            } => {
                assert_eq!(*code, Some(3));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn env_and_cwd_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ProcessSpec::new("pwd", "sh")
            .args(["-c", "echo \"$STACKUP_PROBE\"; pwd"])
            .env(Env::new().with("STACKUP_PROBE", "visible"))
            .cwd(dir.path());

        let out = run(&spec).await.unwrap();
        let mut lines = out.stdout.lines();
        assert_eq!(lines.next(), Some("visible"));

        let reported = std::fs::canonicalize(lines.next().unwrap()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = run(&ProcessSpec::new("ghost", "/nonexistent/stackup-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
