//! Server configuration.
//!
//! Loads settings from `overlaycast.toml` in the working directory (or an
//! explicit `--config` path). Every section and field has a default, so the
//! server runs without any configuration file at all.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5000
//!
//! [streams]
//! root = "./streams"
//! transcoder = "ffmpeg"
//! grace_period_secs = 5
//!
//! [cors]
//! allowed_origins = ["http://localhost:3000"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "overlaycast.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Stream supervisor settings.
    pub streams: StreamSettings,
    /// CORS allow-list.
    pub cors: CorsSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Port for the HTTP API.
    pub port: u16,
    /// Base URL used when building externally reachable playlist URLs.
    /// Defaults to `http://localhost:<port>`.
    pub public_base_url: Option<String>,
}

/// Stream supervisor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    /// Root directory for per-stream output directories. Created at startup.
    pub root: PathBuf,
    /// Transcoder executable name or path.
    pub transcoder: String,
    /// Seconds to wait after spawn before the single startup liveness poll.
    pub startup_check_secs: u64,
    /// Seconds to wait for a process to exit after a graceful stop request.
    pub grace_period_secs: u64,
}

/// CORS allow-list settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsSettings {
    /// Origins that receive CORS allow headers.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_base_url: None,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./streams"),
            transcoder: "ffmpeg".to_string(),
            startup_check_secs: 1,
            grace_period_secs: 5,
        }
    }
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:3001".to_string(),
                "http://127.0.0.1:3001".to_string(),
            ],
        }
    }
}

impl ServerSettings {
    /// The base URL advertised in stream start responses.
    pub fn effective_base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

impl StreamSettings {
    /// Delay before the single post-spawn liveness poll.
    pub const fn startup_check(&self) -> Duration {
        Duration::from_secs(self.startup_check_secs)
    }

    /// Bounded wait after requesting graceful process termination.
    pub const fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist and parse. With no path,
    /// `overlaycast.toml` is read if present, otherwise defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                anyhow::bail!("config file not found: {}", path.display());
            }
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            port = config.server.port,
            streams_root = %config.streams.root.display(),
            transcoder = %config.streams.transcoder,
            "loaded configuration"
        );

        Ok(config)
    }
}
