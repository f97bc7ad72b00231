use std::{process::Stdio, time::Duration};

use tokio::process::Child;
use tracing::{debug, info, trace, warn};

use crate::{
    ExecError,
    process::{
        group,
        output::{OutputBuffer, Stream, spawn_capture},
        spec::ProcessSpec,
    },
};

/// A running process owned by exactly one launcher.
///
/// Dropping the handle does not stop the process; call [`SupervisedProcess::stop`].
#[derive(Debug)]
pub struct SupervisedProcess {
    name: String,
    command: String,
    pid: Option<u32>,
    child: Option<Child>,
    stdout: OutputBuffer,
    stderr: OutputBuffer,
    stop_grace: Duration,
}

/// Start `spec` in its own process group and return once the OS reports it running.
///
/// Stdout and stderr are always captured. Must be called from within a tokio runtime.
pub fn start(spec: &ProcessSpec) -> Result<SupervisedProcess, ExecError> {
    spec.validate()?;
    spec.trace_state();

    let command = spec.command_line();
    let mut cmd = spec.to_command();
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    group::detach_into_own_group(&mut cmd);

    let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
        command: command.clone(),
        source,
    })?;
    let pid = child.id();

    let stdout = OutputBuffer::new();
    let stderr = OutputBuffer::new();
    if let Some(out) = child.stdout.take() {
        spawn_capture(spec.name.clone(), Stream::Stdout, out, stdout.clone(), spec.log);
    }
    if let Some(err) = child.stderr.take() {
        spawn_capture(spec.name.clone(), Stream::Stderr, err, stderr.clone(), spec.log);
    }

    info!(process = %spec.name, pid = ?pid, command = %command, "process started");
    Ok(SupervisedProcess {
        name: spec.name.clone(),
        command,
        pid,
        child: Some(child),
        stdout,
        stderr,
        stop_grace: spec.stop_grace,
    })
}

impl SupervisedProcess {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// `true` until [`SupervisedProcess::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.child.is_none()
    }

    /// Captured stdout so far.
    pub fn stdout(&self) -> String {
        self.stdout.contents()
    }

    /// Captured stderr so far.
    pub fn stderr(&self) -> String {
        self.stderr.contents()
    }

    /// Terminate the process group and wait for the leader to exit.
    ///
    /// Sends SIGTERM to the group, waits up to the stop grace period, then
    /// sends SIGKILL and waits again. A group that no longer exists counts as
    /// stopped. Only the first call does anything; later calls return `Ok(())`.
    pub async fn stop(&mut self) -> Result<(), ExecError> {
        let Some(mut child) = self.child.take() else {
            trace!(process = %self.name, "stop called on an already stopped process");
            return Ok(());
        };

        debug!(process = %self.name, pid = ?self.pid, "stopping process group");
        let signal_error = self.terminate(&mut child);

        match tokio::time::timeout(self.stop_grace, child.wait()).await {
            Ok(Ok(status)) => debug!(process = %self.name, %status, "process exited"),
            Ok(Err(source)) => {
                return Err(ExecError::Wait {
                    name: self.name.clone(),
                    source,
                });
            }
            Err(_) => {
                warn!(
                    process = %self.name,
                    grace = ?self.stop_grace,
                    "process ignored termination request; killing"
                );
                self.kill(&mut child);
                let status = child.wait().await.map_err(|source| ExecError::Wait {
                    name: self.name.clone(),
                    source,
                })?;
                debug!(process = %self.name, %status, "process killed");
            }
        }

        match signal_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Request graceful termination; returns the signalling error, if any,
    /// after falling back to killing the leader directly.
    #[cfg(unix)]
    fn terminate(&self, child: &mut Child) -> Option<ExecError> {
        let pgid = self.pgid()?;
        match group::signal_group(pgid, libc::SIGTERM) {
            Ok(delivery) => {
                trace!(process = %self.name, pgid, ?delivery, "SIGTERM delivered");
                None
            }
            Err(source) => {
                warn!(process = %self.name, pgid, "failed to signal process group: {source}");
                let _ = child.start_kill();
                Some(ExecError::Signal {
                    name: self.name.clone(),
                    pgid,
                    source,
                })
            }
        }
    }

    #[cfg(not(unix))]
    fn terminate(&self, child: &mut Child) -> Option<ExecError> {
        let _ = child.start_kill();
        None
    }

    #[cfg(unix)]
    fn kill(&self, child: &mut Child) {
        if let Some(pgid) = self.pgid() {
            if let Err(e) = group::signal_group(pgid, libc::SIGKILL) {
                warn!(process = %self.name, pgid, "failed to kill process group: {e}");
            }
        }
        let _ = child.start_kill();
    }

    #[cfg(not(unix))]
    fn kill(&self, child: &mut Child) {
        let _ = child.start_kill();
    }

    #[cfg(unix)]
    fn pgid(&self) -> Option<i32> {
        self.pid.and_then(|pid| i32::try_from(pid).ok())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Instant;

    use super::*;

    #[tokio::test]
    async fn start_returns_without_waiting_for_exit() {
        let spec = ProcessSpec::new("sleeper", "sleep").arg("30");
        let started = Instant::now();
        let mut proc = start(&spec).unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(proc.pid().is_some());
        assert!(!proc.is_stopped());

        proc.stop().await.unwrap();
        assert!(proc.is_stopped());
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut proc = start(&ProcessSpec::new("sleeper", "sleep").arg("30")).unwrap();
        proc.stop().await.unwrap();
        proc.stop().await.unwrap();
        proc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_after_natural_exit_succeeds() {
        let mut proc = start(&ProcessSpec::new("quick", "true")).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        proc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_reaches_forked_children() {
        // The shell forks a grandchild and then blocks on it; both share the group.
        let spec = ProcessSpec::new("tree", "sh").args(["-c", "sleep 30 & echo $!; wait"]);
        let mut proc = start(&spec).unwrap();

        let mut grandchild = None;
        for _ in 0..100 {
            if let Ok(pid) = proc.stdout().trim().parse::<i32>() {
                grandchild = Some(pid);
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let grandchild = grandchild.expect("grandchild pid was not printed");

        proc.stop().await.unwrap();

        let mut gone = false;
        for _ in 0..100 {
            if !alive(grandchild) {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(gone, "grandchild {grandchild} survived group termination");
    }

    /// Zombies awaiting a reaper count as dead.
    #[cfg(target_os = "linux")]
    fn alive(pid: i32) -> bool {
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => {
                let state = stat
                    .rsplit_once(')')
                    .and_then(|(_, rest)| rest.trim_start().chars().next());
                state != Some('Z')
            }
            Err(_) => false,
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn alive(pid: i32) -> bool {
        unsafe { libc::kill(pid, 0) == 0 }
    }

    #[tokio::test]
    async fn stop_escalates_to_kill_after_grace() {
        let spec = ProcessSpec::new("stubborn", "sh")
            .args(["-c", "trap '' TERM; echo ready; while true; do sleep 1; done"])
            .stop_grace(Duration::from_millis(300));
        let mut proc = start(&spec).unwrap();

        for _ in 0..100 {
            if proc.stdout().contains("ready") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let started = Instant::now();
        proc.stop().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr_separately() {
        let spec = ProcessSpec::new("echo", "sh").args(["-c", "echo out; echo err >&2; sleep 30"]);
        let mut proc = start(&spec).unwrap();

        for _ in 0..100 {
            if proc.stdout().contains("out") && proc.stderr().contains("err") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(proc.stdout(), "out\n");
        assert_eq!(proc.stderr(), "err\n");

        proc.stop().await.unwrap();
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let err = start(&ProcessSpec::new("ghost", "/nonexistent/stackup-binary")).unwrap_err();
        match err {
            ExecError::Spawn { command, .. } => assert_eq!(command, "/nonexistent/stackup-binary"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
