//! Error types for the streaming gateway.
//!
//! Structured errors for stream supervision and overlay storage, with HTTP
//! status code mappings used by the API layer.

use std::time::Duration;

/// Maximum number of characters of captured transcoder output included in a
/// spawn-failure diagnostic.
pub const DIAGNOSTIC_EXCERPT_CHARS: usize = 500;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Gateway errors with structured context.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Invalid request input (malformed URL, missing or out-of-range fields).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Stream not present in the registry (or on disk, for file lookups).
    #[error("stream not found: {stream_id}")]
    StreamNotFound { stream_id: String },

    /// Overlay not present in the store.
    #[error("overlay not found: {overlay_id}")]
    OverlayNotFound { overlay_id: String },

    /// A playlist or segment file the transcoder has not produced (yet).
    #[error("file not found: {filename}")]
    FileNotFound { filename: String },

    /// The transcoder executable was not found at startup.
    #[error("transcoder '{binary}' is not available")]
    TranscoderUnavailable { binary: String },

    /// The transcoder process exited during the startup check window.
    /// Carries the full captured output; see [`Error::diagnostic_excerpt`].
    #[error("transcoder exited during startup")]
    SpawnFailed { output: String },

    /// The process outlived the termination grace period.
    #[error("process {pid} still alive after {grace:?} grace period")]
    TerminationTimeout { pid: u32, grace: Duration },

    /// IO error with context.
    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a stream not found error.
    pub fn stream_not_found(stream_id: impl Into<String>) -> Self {
        Self::StreamNotFound {
            stream_id: stream_id.into(),
        }
    }

    /// Create an overlay not found error.
    pub fn overlay_not_found(overlay_id: impl Into<String>) -> Self {
        Self::OverlayNotFound {
            overlay_id: overlay_id.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::StreamNotFound { .. }
            | Self::OverlayNotFound { .. }
            | Self::FileNotFound { .. } => 404,
            Self::TranscoderUnavailable { .. }
            | Self::SpawnFailed { .. }
            | Self::TerminationTimeout { .. }
            | Self::Io { .. } => 500,
        }
    }

    /// For spawn failures, the first [`DIAGNOSTIC_EXCERPT_CHARS`] characters
    /// of the captured transcoder output. None for other variants.
    pub fn diagnostic_excerpt(&self) -> Option<String> {
        match self {
            Self::SpawnFailed { output } => {
                Some(output.chars().take(DIAGNOSTIC_EXCERPT_CHARS).collect())
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidRequest("bad".into()).status_code(), 400);
        assert_eq!(Error::stream_not_found("abc").status_code(), 404);
        assert_eq!(Error::overlay_not_found("abc").status_code(), 404);
        assert_eq!(
            Error::FileNotFound {
                filename: "index.m3u8".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            Error::TranscoderUnavailable {
                binary: "ffmpeg".into()
            }
            .status_code(),
            500
        );
        assert_eq!(
            Error::SpawnFailed { output: String::new() }.status_code(),
            500
        );
    }

    #[test]
    fn test_diagnostic_excerpt_truncates() {
        let err = Error::SpawnFailed {
            output: "x".repeat(2000),
        };
        assert_eq!(err.diagnostic_excerpt().unwrap().len(), 500);

        let err = Error::SpawnFailed {
            output: "short output".into(),
        };
        assert_eq!(err.diagnostic_excerpt().unwrap(), "short output");

        assert!(Error::stream_not_found("x").diagnostic_excerpt().is_none());
    }
}
