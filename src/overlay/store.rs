//! Overlay repository.
//!
//! [`OverlayStore`] is the seam where a document database plugs in; the
//! gateway ships with the in-memory backend and treats external persistence
//! as a deployment concern.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Overlay, OverlayDraft, OverlayPatch};
use crate::error::{Error, Result};

/// Repository interface for overlay documents.
///
/// All operations must be safe under concurrent invocation from multiple
/// in-flight requests. Implementations generate document ids.
#[async_trait]
pub trait OverlayStore: Send + Sync {
    /// All overlays, newest first.
    async fn list(&self) -> Result<Vec<Overlay>>;

    /// Store a new overlay and return it with its generated id.
    async fn create(&self, draft: OverlayDraft) -> Result<Overlay>;

    /// Fetch one overlay by id.
    async fn get(&self, id: &str) -> Result<Overlay>;

    /// Apply a partial update and return the updated document.
    async fn update(&self, id: &str, patch: OverlayPatch) -> Result<Overlay>;

    /// Delete one overlay by id.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete several overlays; returns how many actually existed.
    async fn delete_many(&self, ids: &[String]) -> Result<usize>;

    /// Short backend name for health reporting.
    fn backend(&self) -> &'static str;
}

/// In-memory overlay storage.
#[derive(Default)]
pub struct MemoryOverlayStore {
    entries: RwLock<Vec<Overlay>>,
}

impl MemoryOverlayStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OverlayStore for MemoryOverlayStore {
    async fn list(&self) -> Result<Vec<Overlay>> {
        // Stored in creation order; reversed for newest-first listing
        Ok(self.entries.read().iter().rev().cloned().collect())
    }

    async fn create(&self, draft: OverlayDraft) -> Result<Overlay> {
        let now = Utc::now();
        let overlay = Overlay {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            content: draft.content,
            position: draft.position,
            size: draft.size,
            created_at: now,
            updated_at: now,
        };
        self.entries.write().push(overlay.clone());
        Ok(overlay)
    }

    async fn get(&self, id: &str) -> Result<Overlay> {
        self.entries
            .read()
            .iter()
            .find(|overlay| overlay.id == id)
            .cloned()
            .ok_or_else(|| Error::overlay_not_found(id))
    }

    async fn update(&self, id: &str, patch: OverlayPatch) -> Result<Overlay> {
        let mut entries = self.entries.write();
        let overlay = entries
            .iter_mut()
            .find(|overlay| overlay.id == id)
            .ok_or_else(|| Error::overlay_not_found(id))?;

        if let Some(kind) = patch.kind {
            overlay.kind = kind;
        }
        if let Some(content) = patch.content {
            overlay.content = content;
        }
        if let Some(position) = patch.position {
            overlay.position = position;
        }
        if let Some(size) = patch.size {
            overlay.size = size;
        }
        overlay.updated_at = Utc::now();

        Ok(overlay.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|overlay| overlay.id != id);
        if entries.len() == before {
            return Err(Error::overlay_not_found(id));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[String]) -> Result<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|overlay| !ids.contains(&overlay.id));
        Ok(before - entries.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{OverlayKind, Position, Size};

    fn draft(content: &str) -> OverlayDraft {
        OverlayDraft {
            kind: OverlayKind::Text,
            content: content.to_string(),
            position: Position::default(),
            size: Size::default(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryOverlayStore::new();
        let created = store.create(draft("hello")).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.content, "hello");
        assert_eq!(fetched.kind, OverlayKind::Text);
        assert_eq!(fetched.created_at, fetched.updated_at);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryOverlayStore::new();
        let first = store.create(draft("first")).await.unwrap();
        let second = store.create(draft("second")).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn test_update_patches_and_bumps_timestamp() {
        let store = MemoryOverlayStore::new();
        let created = store.create(draft("before")).await.unwrap();

        let patch = OverlayPatch {
            content: Some("after".to_string()),
            size: Some(Size { width: 640, height: 360 }),
            ..Default::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap();

        assert_eq!(updated.content, "after");
        assert_eq!(updated.size.width, 640);
        // Untouched fields keep their values
        assert_eq!(updated.kind, created.kind);
        assert_eq!(updated.position, created.position);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let store = MemoryOverlayStore::new();
        let err = store
            .update("missing", OverlayPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryOverlayStore::new();
        let created = store.create(draft("bye")).await.unwrap();

        store.delete(&created.id).await.unwrap();
        assert_eq!(store.get(&created.id).await.unwrap_err().status_code(), 404);
        assert_eq!(store.delete(&created.id).await.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing() {
        let store = MemoryOverlayStore::new();
        let a = store.create(draft("a")).await.unwrap();
        let b = store.create(draft("b")).await.unwrap();
        store.create(draft("c")).await.unwrap();

        let deleted = store
            .delete_many(&[a.id, b.id, "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
