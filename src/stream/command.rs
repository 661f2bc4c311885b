//! Transcoder invocation builder.
//!
//! Pure construction of the ffmpeg argument list for a stream source. Both
//! source kinds share the same HLS output shape: short segments, a bounded
//! rolling window with old segments deleted, and a deterministic segment
//! naming pattern inside the stream's output directory.

use std::path::Path;

use super::source::StreamSource;

/// Playlist file name inside each stream directory.
pub const PLAYLIST_FILENAME: &str = "index.m3u8";

/// Segment file naming pattern (ffmpeg printf-style).
const SEGMENT_PATTERN: &str = "segment_%03d.ts";

/// Target segment duration in seconds.
const SEGMENT_SECONDS: u32 = 2;

/// Number of segments kept in the playlist's rolling window.
const WINDOW_SEGMENTS: u32 = 10;

/// RTSP connection timeout in microseconds (10 seconds).
const RTSP_TIMEOUT_US: u64 = 10_000_000;

/// Build the transcoder argument list for `source`, writing into `output_dir`.
///
/// RTSP sources are pulled over TCP with a bounded connection timeout, video
/// is passed through without re-encoding (copy) to minimize latency, and
/// audio is transcoded to AAC. The test pattern generates `testsrc` video and
/// a sine tone locally, encoded with a zero-latency x264 preset. Output files
/// are always overwritten.
pub fn hls_args(source: &StreamSource, output_dir: &Path) -> Vec<String> {
    let playlist = output_dir.join(PLAYLIST_FILENAME).to_string_lossy().into_owned();
    let segments = output_dir.join(SEGMENT_PATTERN).to_string_lossy().into_owned();

    let mut args: Vec<String> = match source {
        StreamSource::Rtsp(url) => vec![
            "-rtsp_transport".into(),
            "tcp".into(),
            "-timeout".into(),
            RTSP_TIMEOUT_US.to_string(),
            "-i".into(),
            url.clone(),
            "-c:v".into(),
            "copy".into(),
            "-c:a".into(),
            "aac".into(),
        ],
        StreamSource::TestPattern => vec![
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            "testsrc=duration=300:size=1280x720:rate=30".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            "sine=frequency=1000:duration=300".into(),
            "-c:v".into(),
            "libx264".into(),
            "-preset".into(),
            "ultrafast".into(),
            "-tune".into(),
            "zerolatency".into(),
            "-c:a".into(),
            "aac".into(),
        ],
    };

    args.extend([
        "-f".into(),
        "hls".into(),
        "-hls_time".into(),
        SEGMENT_SECONDS.to_string(),
        "-hls_list_size".into(),
        WINDOW_SEGMENTS.to_string(),
        "-hls_flags".into(),
        "delete_segments+append_list".into(),
        "-hls_segment_filename".into(),
        segments,
        "-y".into(),
        playlist,
    ]);

    args
}
