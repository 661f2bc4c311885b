// =============================================================================
// Lint Configuration
// =============================================================================

// Safety: no unsafe code anywhere in this crate
#![deny(unsafe_code)]
// Correctness: Must handle all fallible operations
#![deny(unused_must_use)]
#![warn(clippy::all)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![allow(clippy::module_name_repetitions)] // e.g., stream::StreamRegistry is clearer

//! overlaycast - RTSP to HLS streaming gateway with overlay management.
//!
//! The server does two things:
//!
//! - Spawns and supervises per-stream ffmpeg processes that convert an RTSP
//!   source (or a locally generated test pattern) into an HLS playlist plus a
//!   rolling window of media segments, tracked in a concurrent registry and
//!   torn down on stop or process shutdown.
//! - Stores overlay records (text/image annotations with position and size)
//!   behind a repository interface with an in-memory backend.
//!
//! The [`stream`] module is the supervisor core; [`server`] exposes it (and
//! the overlay store) over an axum HTTP API.

/// TOML configuration for the server, stream supervisor, and CORS allow-list.
pub mod config;

/// Error taxonomy with HTTP status code mappings.
pub mod error;

/// Overlay documents and the repository interface that stores them.
pub mod overlay;

/// HTTP API: router, request/response types, and handlers.
pub mod server;

/// Stream process supervisor: transcoder invocation, process handles,
/// output draining, the stream registry, and lifecycle orchestration.
pub mod stream;
