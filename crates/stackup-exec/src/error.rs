use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid process specification: {0}")]
    InvalidSpec(String),

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to signal process group {pgid} of '{name}': {source}")]
    Signal {
        name: String,
        pgid: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for '{name}' to exit: {source}")]
    Wait {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    NonZeroExit {
        command: String,
        status: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}
