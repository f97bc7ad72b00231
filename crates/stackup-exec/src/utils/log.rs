//! Logging for `pre_exec` hooks.
//!
//! Runs between `fork()` and `execve()`, where allocation and locking are not
//! allowed, so everything goes through stack buffers and `libc::write`.

/// Write `stackup-exec: <msg> errno=<n>\n` to stderr.
#[cfg(unix)]
pub(crate) fn pre_exec_report(msg: &[u8], errno: i32) {
    const PREFIX: &[u8] = b"stackup-exec: ";
    const ERRNO: &[u8] = b" errno=";
    const NEWLINE: &[u8] = b"\n";

    let mut digits = [0u8; 12];
    let mut idx = digits.len();
    let mut n = errno.unsigned_abs();
    loop {
        idx -= 1;
        digits[idx] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    if errno < 0 {
        idx -= 1;
        digits[idx] = b'-';
    }

    for part in [PREFIX, msg, ERRNO, &digits[idx..], NEWLINE] {
        write_stderr(part);
    }
}

#[cfg(unix)]
fn write_stderr(bytes: &[u8]) {
    unsafe {
        libc::write(
            libc::STDERR_FILENO,
            bytes.as_ptr() as *const libc::c_void,
            bytes.len(),
        );
    }
}
