//! HTTP API handlers.

pub mod overlays;
pub mod streams;

pub(crate) use overlays::{
    bulk_delete_overlays, create_overlay, delete_overlay, get_overlay, list_overlays,
    update_overlay,
};
pub(crate) use streams::{
    health, serve_stream_file, start_stream, start_test_stream, stop_stream, stop_stream_by_path,
    stream_status,
};
