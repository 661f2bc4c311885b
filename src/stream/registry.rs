//! Stream records and the concurrent stream registry.
//!
//! The registry is the single source of truth for which streams exist. A
//! record is present iff its process was successfully spawned and has not
//! been explicitly stopped or reaped at shutdown; a process that dies on its
//! own stays visible (reported as not running) until an explicit stop.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::process::TranscoderProcess;
use super::source::StreamSource;
use crate::error::{Error, Result};

/// One tracked stream: identity, source, filesystem namespace, and the
/// exclusively owned process handle.
#[derive(Debug)]
pub struct StreamRecord {
    /// Registry key and filesystem namespace. Immutable, never reused while
    /// the record is present.
    pub stream_id: String,
    /// Where the media comes from, recorded for status reporting.
    pub source: StreamSource,
    /// Directory the transcoder writes into.
    pub output_dir: PathBuf,
    /// Playlist file inside `output_dir`; not guaranteed to exist until the
    /// transcoder has produced its first segments.
    pub playlist_path: PathBuf,
    /// Spawn timestamp.
    pub started_at: DateTime<Utc>,
    // The process handle needs exclusive access for polling and termination;
    // no other component may signal or wait on it.
    process: tokio::sync::Mutex<TranscoderProcess>,
}

impl StreamRecord {
    /// Build a record around a freshly spawned process.
    pub fn new(
        stream_id: String,
        source: StreamSource,
        output_dir: PathBuf,
        playlist_path: PathBuf,
        process: TranscoderProcess,
    ) -> Self {
        Self {
            stream_id,
            source,
            output_dir,
            playlist_path,
            started_at: Utc::now(),
            process: tokio::sync::Mutex::new(process),
        }
    }

    /// Live-poll the process; not cached.
    pub async fn is_running(&self) -> bool {
        self.process.lock().await.is_running()
    }

    /// Terminate the process with the given grace period (see
    /// [`TranscoderProcess::terminate`]).
    pub async fn terminate(&self, grace: Duration) -> Result<()> {
        self.process.lock().await.terminate(grace).await
    }
}

/// Concurrent mapping of stream id to record.
///
/// All operations serialize through one lock, so a remove racing a get for
/// the same key resolves deterministically: one wins, the other observes the
/// post-state. Iteration always works on snapshots.
#[derive(Debug, Default)]
pub struct StreamRegistry {
    streams: Mutex<HashMap<String, Arc<StreamRecord>>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record under its stream id.
    pub fn insert(&self, record: Arc<StreamRecord>) {
        self.streams
            .lock()
            .insert(record.stream_id.clone(), record);
    }

    /// Look up a record by id.
    pub fn get(&self, stream_id: &str) -> Result<Arc<StreamRecord>> {
        self.streams
            .lock()
            .get(stream_id)
            .cloned()
            .ok_or_else(|| Error::stream_not_found(stream_id))
    }

    /// Remove and return a record by id.
    pub fn remove(&self, stream_id: &str) -> Result<Arc<StreamRecord>> {
        self.streams
            .lock()
            .remove(stream_id)
            .ok_or_else(|| Error::stream_not_found(stream_id))
    }

    /// Snapshot of all records. Insertion order is not significant.
    pub fn list_all(&self) -> Vec<Arc<StreamRecord>> {
        self.streams.lock().values().cloned().collect()
    }

    /// Drain the registry, returning every record. Used only at shutdown.
    pub fn remove_all(&self) -> Vec<Arc<StreamRecord>> {
        self.streams.lock().drain().map(|(_, record)| record).collect()
    }

    /// Number of tracked streams.
    pub fn len(&self) -> usize {
        self.streams.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.lock().is_empty()
    }
}
