//! Clipboard bridge backed by the `arboard` crate.
//!
//! [`SystemClipboard`] creates a short-lived [`arboard::Clipboard`] handle per
//! copy rather than sharing one, because `arboard::Clipboard` is not `Send` on
//! all platforms and the handle is cheap to create.  Copies are a single
//! attempt; callers decide what to do with a failure.

use arboard::Clipboard;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ClipboardError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ClipboardError {
    /// Could not open the system clipboard.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// Could not write text to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    Set(String),
}

// ---------------------------------------------------------------------------
// ClipboardBridge
// ---------------------------------------------------------------------------

/// Copies text to a clipboard.  Blocking; run it on the blocking pool.
pub trait ClipboardBridge: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The operating-system clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardBridge for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Set(e.to_string()))
    }
}
