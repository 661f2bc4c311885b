//! Overlay documents.
//!
//! An overlay is a text or image annotation rendered on top of a stream by
//! the frontend, with a position and a size. Documents live behind the
//! [`store::OverlayStore`] repository interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod store;

pub use store::{MemoryOverlayStore, OverlayStore};

/// Smallest allowed overlay dimension in pixels.
pub const MIN_DIMENSION: u32 = 10;

/// Largest allowed overlay dimension in pixels.
pub const MAX_DIMENSION: u32 = 2000;

/// What an overlay renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    Text,
    Image,
}

impl OverlayKind {
    /// Parse a caller-supplied kind string.
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            _ => Err(Error::InvalidRequest(
                "invalid overlay type, must be 'text' or 'image'".to_string(),
            )),
        }
    }
}

/// On-screen position, in percent of the player viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

/// Rendered size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 200,
            height: 100,
        }
    }
}

impl Size {
    /// Check both dimensions against the allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_DIMENSION || self.width > MAX_DIMENSION {
            return Err(Error::InvalidRequest(format!(
                "width must be between {MIN_DIMENSION} and {MAX_DIMENSION}"
            )));
        }
        if self.height < MIN_DIMENSION || self.height > MAX_DIMENSION {
            return Err(Error::InvalidRequest(format!(
                "height must be between {MIN_DIMENSION} and {MAX_DIMENSION}"
            )));
        }
        Ok(())
    }
}

/// A stored overlay document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlay {
    /// Document id, named `_id` on the wire for frontend compatibility.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OverlayKind,
    /// Text content or image URL, depending on `kind`.
    pub content: String,
    pub position: Position,
    pub size: Size,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating an overlay.
#[derive(Debug, Clone)]
pub struct OverlayDraft {
    pub kind: OverlayKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
}

impl OverlayDraft {
    /// Validate content and dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(Error::InvalidRequest("content is required".to_string()));
        }
        self.size.validate()
    }
}

/// Partial update for an existing overlay; absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct OverlayPatch {
    pub kind: Option<OverlayKind>,
    pub content: Option<String>,
    pub position: Option<Position>,
    pub size: Option<Size>,
}

impl OverlayPatch {
    /// Validate the fields that are present.
    pub fn validate(&self) -> Result<()> {
        if let Some(content) = &self.content {
            if content.is_empty() {
                return Err(Error::InvalidRequest("content cannot be empty".to_string()));
            }
        }
        if let Some(size) = &self.size {
            size.validate()?;
        }
        Ok(())
    }
}
