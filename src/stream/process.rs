//! Transcoder process handle and output drain.
//!
//! Wraps one spawned transcoder process. Both output pipes are drained by
//! background tasks from the moment of spawn, so the child can never block
//! on a full pipe and its log lines reach tracing tagged with the stream id.
//! The drained lines are also appended to a shared, size-capped capture
//! buffer used for startup-failure diagnostics.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};

use crate::error::{Error, Result};

/// Maximum bytes of combined transcoder output kept for diagnostics.
/// Oldest bytes are dropped once the limit is reached.
pub const OUTPUT_CAPTURE_LIMIT: usize = 64 * 1024;

/// Length of the shortened stream id used to tag log lines.
const LOG_TAG_LEN: usize = 8;

/// Shared, size-capped buffer collecting a process's combined output.
#[derive(Clone, Debug, Default)]
pub struct OutputCapture {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl OutputCapture {
    fn push_line(&self, line: &str) {
        let mut buf = self.inner.lock();
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        if buf.len() > OUTPUT_CAPTURE_LIMIT {
            let excess = buf.len() - OUTPUT_CAPTURE_LIMIT;
            buf.drain(..excess);
        }
    }

    /// Everything captured so far, lossily decoded.
    pub fn snapshot(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock()).into_owned()
    }
}

/// Result of a non-blocking liveness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    /// The process is still running.
    Running,
    /// The process has exited, with its exit code when one is available
    /// (None when it was killed by a signal).
    Exited(Option<i32>),
}

/// One spawned transcoder process, exclusively owned by its stream record.
///
/// Dropping the handle requests a kill of the underlying process as a
/// backstop; [`TranscoderProcess::terminate`] is the primary teardown path.
#[derive(Debug)]
pub struct TranscoderProcess {
    child: Child,
    pid: Option<u32>,
    capture: OutputCapture,
}

impl TranscoderProcess {
    /// Spawn the transcoder with the given argument list.
    ///
    /// Output pipes are attached immediately: one drain task per pipe reads
    /// lines until end-of-stream, forwards them to tracing tagged with the
    /// first [`LOG_TAG_LEN`] characters of `stream_id`, and appends them to
    /// the shared capture buffer. The drains end on their own when the
    /// process exits; nothing ever waits on them.
    pub fn spawn(binary: &str, args: &[String], stream_id: &str) -> Result<Self> {
        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::io(format!("spawning transcoder '{binary}'"), e))?;

        let pid = child.id();
        let capture = OutputCapture::default();
        let tag: String = stream_id.chars().take(LOG_TAG_LEN).collect();

        if let Some(stdout) = child.stdout.take() {
            drain_lines(stdout, tag.clone(), capture.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            drain_lines(stderr, tag, capture.clone());
        }

        Ok(Self { child, pid, capture })
    }

    /// Operating system process id, if the process was still running when
    /// the handle was created.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The shared capture buffer for this process's combined output.
    pub fn capture(&self) -> &OutputCapture {
        &self.capture
    }

    /// Non-blocking liveness poll.
    pub fn poll(&mut self) -> ProcessStatus {
        match self.child.try_wait() {
            Ok(None) => ProcessStatus::Running,
            Ok(Some(status)) => ProcessStatus::Exited(status.code()),
            Err(e) => {
                tracing::warn!(pid = ?self.pid, error = %e, "failed to poll transcoder");
                ProcessStatus::Running
            },
        }
    }

    /// Whether the process is still running at call time.
    pub fn is_running(&mut self) -> bool {
        self.poll() == ProcessStatus::Running
    }

    /// Request graceful termination, wait up to `grace` for exit.
    ///
    /// Sends SIGTERM first; a process still alive after the grace period is
    /// killed outright and reported as a [`Error::TerminationTimeout`]. This
    /// never blocks beyond the grace period.
    pub async fn terminate(&mut self, grace: Duration) -> Result<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }

        self.request_graceful_stop();

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                tracing::debug!(pid = ?self.pid, status = ?status.code(), "transcoder exited");
                Ok(())
            },
            Ok(Err(e)) => Err(Error::io("waiting for transcoder exit", e)),
            Err(_) => {
                // Unresponsive past the grace period: kill so the process
                // cannot outlive its registry entry, but still report the
                // timeout upward.
                let _ = self.child.start_kill();
                Err(Error::TerminationTimeout {
                    pid: self.pid.unwrap_or_default(),
                    grace,
                })
            },
        }
    }

    #[cfg(unix)]
    fn request_graceful_stop(&mut self) {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        // kill can fail if the process exited between the poll and the
        // signal; the bounded wait sorts that out
        if let Some(pid) = self.child.id() {
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }

    #[cfg(not(unix))]
    fn request_graceful_stop(&mut self) {
        let _ = self.child.start_kill();
    }
}

/// Spawn a drain task reading `stream` line by line until end-of-stream.
fn drain_lines<R>(stream: R, tag: String, capture: OutputCapture)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim_end();
            if !line.is_empty() {
                tracing::info!(stream = %tag, "[transcoder] {line}");
            }
            capture.push_line(line);
        }
    });
}
