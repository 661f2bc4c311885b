//! Stream process supervision.
//!
//! Each active stream is one external transcoder process writing an HLS
//! playlist and a rolling window of media segments into its own directory
//! under the streams root. This module owns the full lifecycle:
//!
//! - [`source`]: the source descriptor (RTSP URL or synthetic test pattern)
//! - [`command`]: builds the transcoder argument list for a source
//! - [`process`]: the spawned process handle and its output drain
//! - [`registry`]: the concurrent map of active streams
//! - [`dirs`]: the per-stream filesystem namespace
//! - [`supervisor`]: start/stop/status/shutdown orchestration
//!
//! Directories are never deleted by the gateway; segment cleanup inside a
//! live stream is the transcoder's job (rolling window), and abandoned
//! directories are left for external cleanup.

pub mod command;
pub mod dirs;
pub mod process;
pub mod registry;
pub mod source;
pub mod supervisor;

pub use dirs::StreamDirs;
pub use process::{ProcessStatus, TranscoderProcess};
pub use registry::{StreamRecord, StreamRegistry};
pub use source::StreamSource;
pub use supervisor::{StreamStatus, StreamSupervisor};
