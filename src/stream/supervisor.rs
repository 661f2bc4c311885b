//! Stream lifecycle orchestration.
//!
//! The supervisor ties the other stream components together: it validates
//! and spawns new streams, distinguishes immediate spawn failures from
//! running streams, answers status queries with live-polled process state,
//! and tears everything down at process shutdown.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::command;
use super::dirs::StreamDirs;
use super::process::{ProcessStatus, TranscoderProcess};
use super::registry::{StreamRecord, StreamRegistry};
use super::source::StreamSource;
use crate::config::StreamSettings;
use crate::error::{Error, Result};

/// Status of one tracked stream, as returned by [`StreamSupervisor::status`].
#[derive(Debug, Clone)]
pub struct StreamStatus {
    pub stream_id: String,
    pub source: String,
    pub started_at: DateTime<Utc>,
    /// Live-polled at call time, never cached.
    pub running: bool,
}

/// Spawns, tracks, and tears down per-stream transcoder processes.
#[derive(Debug)]
pub struct StreamSupervisor {
    registry: StreamRegistry,
    dirs: StreamDirs,
    transcoder: String,
    startup_check: Duration,
    grace_period: Duration,
    transcoder_available: bool,
}

impl StreamSupervisor {
    /// Build the supervisor: create the streams root and probe the
    /// transcoder executable once.
    pub fn new(settings: &StreamSettings) -> anyhow::Result<Self> {
        let dirs = StreamDirs::new(&settings.root)?;
        let transcoder_available = probe_transcoder(&settings.transcoder);
        if transcoder_available {
            tracing::info!(transcoder = %settings.transcoder, "transcoder is available");
        } else {
            tracing::error!(
                transcoder = %settings.transcoder,
                "transcoder not found, stream endpoints will fail"
            );
        }

        Ok(Self {
            registry: StreamRegistry::new(),
            dirs,
            transcoder: settings.transcoder.clone(),
            startup_check: settings.startup_check(),
            grace_period: settings.grace_period(),
            transcoder_available,
        })
    }

    /// Whether the transcoder executable was found at startup.
    pub fn transcoder_available(&self) -> bool {
        self.transcoder_available
    }

    /// Number of tracked streams.
    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Start a new stream for `source`.
    ///
    /// Spawns the transcoder into a freshly allocated directory, then waits
    /// a short fixed interval and polls exactly once: a process that has
    /// already exited is treated as a startup failure carrying the captured
    /// output, and nothing is registered. Otherwise the record becomes
    /// visible in the registry and is returned. The playlist is not
    /// guaranteed to exist yet; segments appear after a startup delay
    /// dictated by the segmenting parameters.
    pub async fn start(&self, source: StreamSource) -> Result<Arc<StreamRecord>> {
        if !self.transcoder_available {
            return Err(Error::TranscoderUnavailable {
                binary: self.transcoder.clone(),
            });
        }

        let stream_id = Uuid::new_v4().to_string();
        let output_dir = self.dirs.allocate(&stream_id)?;
        let playlist_path = output_dir.join(command::PLAYLIST_FILENAME);
        let args = command::hls_args(&source, &output_dir);

        tracing::info!(
            stream = %short_id(&stream_id),
            source = %source,
            dir = %output_dir.display(),
            "starting transcoder"
        );
        let mut process = TranscoderProcess::spawn(&self.transcoder, &args, &stream_id)?;

        // Single fixed-delay liveness check: distinguishes an invalid source
        // or invocation (immediate exit) from a stream that came up. A
        // process dying after this window stays visible until stopped.
        tokio::time::sleep(self.startup_check).await;
        if let ProcessStatus::Exited(code) = process.poll() {
            let output = process.capture().snapshot();
            tracing::error!(
                stream = %short_id(&stream_id),
                exit_code = ?code,
                "transcoder exited during startup"
            );
            return Err(Error::SpawnFailed { output });
        }

        let record = Arc::new(StreamRecord::new(
            stream_id,
            source,
            output_dir,
            playlist_path,
            process,
        ));
        self.registry.insert(Arc::clone(&record));
        tracing::info!(stream = %short_id(&record.stream_id), "stream started");

        Ok(record)
    }

    /// Stop a stream: remove it from the registry, then terminate its
    /// process best-effort.
    ///
    /// The record is gone from status output as soon as this returns,
    /// whether or not the process honored the grace period; a termination
    /// timeout is logged, not surfaced.
    pub async fn stop(&self, stream_id: &str) -> Result<()> {
        let record = self.registry.remove(stream_id)?;

        if let Err(e) = record.terminate(self.grace_period).await {
            tracing::warn!(
                stream = %short_id(stream_id),
                error = %e,
                "transcoder did not stop cleanly"
            );
        } else {
            tracing::info!(stream = %short_id(stream_id), "stream stopped");
        }

        Ok(())
    }

    /// Status of every tracked stream, with `running` polled live.
    pub async fn status(&self) -> Vec<StreamStatus> {
        let records = self.registry.list_all();
        let mut statuses = Vec::with_capacity(records.len());
        for record in records {
            statuses.push(StreamStatus {
                stream_id: record.stream_id.clone(),
                source: record.source.descriptor().to_string(),
                started_at: record.started_at,
                running: record.is_running().await,
            });
        }
        statuses
    }

    /// Resolve a playlist or segment file for the file-serving layer.
    pub fn resolve_stream_file(&self, stream_id: &str, filename: &str) -> Result<std::path::PathBuf> {
        self.dirs.resolve_file(stream_id, filename)
    }

    /// Terminate every tracked stream, best-effort, bounded by the grace
    /// period.
    ///
    /// Invoked once at process-wide shutdown. Terminations run concurrently
    /// so the whole pass completes within one grace period plus overhead,
    /// and individual failures are logged, never propagated: the process
    /// must be able to exit even if some transcoder refuses to die.
    pub async fn shutdown_all(&self) {
        let records = self.registry.remove_all();
        if records.is_empty() {
            return;
        }
        tracing::info!(count = records.len(), "stopping active streams");

        let grace = self.grace_period;
        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            handles.push(tokio::spawn(async move {
                if let Err(e) = record.terminate(grace).await {
                    tracing::warn!(
                        stream = %short_id(&record.stream_id),
                        error = %e,
                        "failed to stop stream during shutdown"
                    );
                }
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }

        tracing::info!("stream shutdown complete");
    }
}

/// Shortened stream id used in log output.
fn short_id(stream_id: &str) -> &str {
    stream_id.get(..8).unwrap_or(stream_id)
}

/// Check whether the transcoder executable runs at all.
fn probe_transcoder(binary: &str) -> bool {
    std::process::Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
