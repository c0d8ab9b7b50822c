//! Scoped preview resources.
//!
//! A [`PreviewStore`] turns a selected file into something the UI can draw
//! (the desktop app uploads an egui texture).  [`PreviewHandle`] owns one such
//! resource and releases it in `Drop`, so replacing or clearing the selection
//! frees the previous preview exactly once.

use std::fmt;
use std::sync::Arc;

use super::state::ImageSource;

/// Identifies one preview resource inside its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(pub u64);

/// Acquires and releases preview resources.
pub trait PreviewStore: Send + Sync {
    /// Build a preview for `source`.  `None` when it cannot be displayed
    /// (the UI then shows its placeholder).
    fn acquire(&self, source: &ImageSource) -> Option<PreviewId>;

    /// Free the resource behind `id`.
    fn release(&self, id: PreviewId);
}

/// Store that never produces a preview, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreview;

impl PreviewStore for NoPreview {
    fn acquire(&self, _source: &ImageSource) -> Option<PreviewId> {
        None
    }

    fn release(&self, _id: PreviewId) {}
}

/// Owning handle on an acquired preview; released on drop.
pub struct PreviewHandle {
    id: PreviewId,
    store: Arc<dyn PreviewStore>,
}

impl PreviewHandle {
    pub fn acquire(store: &Arc<dyn PreviewStore>, source: &ImageSource) -> Option<Self> {
        store.acquire(source).map(|id| Self {
            id,
            store: Arc::clone(store),
        })
    }

    pub fn id(&self) -> PreviewId {
        self.id
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}

impl fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PreviewHandle").field(&self.id).finish()
    }
}
