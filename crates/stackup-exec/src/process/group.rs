//! Process-group plumbing.
//!
//! Each supervised process leads its own group (`pgid == pid`), so a single
//! signal reaches it together with every child it forked.
use tokio::process::Command;

/// Make the spawned process the leader of a new process group.
#[cfg(unix)]
pub(crate) fn detach_into_own_group(cmd: &mut Command) {
    unsafe {
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) != 0 {
                let err = std::io::Error::last_os_error();
                crate::utils::pre_exec_report(b"setpgid failed", err.raw_os_error().unwrap_or(0));
                return Err(err);
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
pub(crate) fn detach_into_own_group(_cmd: &mut Command) {}

/// Outcome of signalling a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Sent,
    /// No process is left in the group.
    Gone,
}

/// Send `signal` to every process in group `pgid`.
#[cfg(unix)]
pub(crate) fn signal_group(pgid: i32, signal: libc::c_int) -> std::io::Result<Delivery> {
    if unsafe { libc::killpg(pgid, signal) } == 0 {
        return Ok(Delivery::Sent);
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => Ok(Delivery::Gone),
        _ => Err(err),
    }
}
