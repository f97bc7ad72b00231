use std::sync::{Arc, Mutex};

use stackup_model::OutputLogConfig;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

/// Shared in-memory sink for one output stream of a process.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer(Arc<Mutex<Vec<u8>>>);

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let guard = self.0.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&guard).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    fn append(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn as_str(self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

/// Drain `reader` line by line into `buffer` until EOF.
///
/// Runs as a detached task so that a process writing more than a pipe's
/// worth of output never blocks on a full pipe.
pub(crate) fn spawn_capture<R>(
    name: String,
    stream: Stream,
    reader: R,
    buffer: OutputBuffer,
    cfg: OutputLogConfig,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    buffer.append(&line);
                    log_line(&name, stream, &line, &cfg);
                }
                Err(e) => {
                    debug!(process = %name, stream = stream.as_str(), "output capture stopped: {e}");
                    break;
                }
            }
        }
    });
}

fn log_line(name: &str, stream: Stream, raw: &[u8], cfg: &OutputLogConfig) {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim_end_matches(['\r', '\n']);
    let text = truncate(text, cfg.max_line_length);

    match stream {
        Stream::Stdout if cfg.stdout_info => info!(process = %name, "{text}"),
        Stream::Stderr if cfg.stderr_warn => warn!(process = %name, "{text}"),
        _ => debug!(process = %name, stream = stream.as_str(), "{text}"),
    }
}

fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
