//! Stream source descriptors.

use std::fmt;

use crate::error::{Error, Result};

/// Descriptor reported by test-pattern streams in status output.
pub const TEST_PATTERN_DESCRIPTOR: &str = "test://pattern";

/// Where a stream's media comes from. Immutable once the stream starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// A live RTSP camera or encoder feed.
    Rtsp(String),
    /// A locally generated test pattern with tone, no network dependency.
    TestPattern,
}

impl StreamSource {
    /// Build an RTSP source from a caller-supplied URL.
    ///
    /// The URL must be non-empty and `rtsp://`-prefixed; anything else is a
    /// validation error and never reaches the transcoder.
    pub fn rtsp(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.is_empty() {
            return Err(Error::InvalidRequest("rtsp_url is required".to_string()));
        }
        if !url.starts_with("rtsp://") {
            return Err(Error::InvalidRequest(
                "invalid RTSP URL format, expected rtsp:// scheme".to_string(),
            ));
        }
        Ok(Self::Rtsp(url))
    }

    /// The descriptor recorded for status reporting.
    pub fn descriptor(&self) -> &str {
        match self {
            Self::Rtsp(url) => url,
            Self::TestPattern => TEST_PATTERN_DESCRIPTOR,
        }
    }
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.descriptor())
    }
}
