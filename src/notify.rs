//! Transient user notifications.
//!
//! The workflow never talks to a toast widget directly; it is handed an
//! `Arc<dyn Notifier>` and calls [`Notifier::notify`].  The desktop app uses
//! [`ChannelNotifier`], which forwards each message over a bounded
//! `tokio::sync::mpsc` channel that the UI drains once per frame.

use tokio::sync::mpsc;

/// Shown when conversion is requested before any file was selected.
pub const NO_SELECTION_MESSAGE: &str = "Please upload an image.";

/// Shown after the extracted text reached the clipboard.
pub const COPY_SUCCESS_MESSAGE: &str = "Text copied to clipboard!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Fire-and-forget sink for user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);
}

// ---------------------------------------------------------------------------
// ChannelNotifier
// ---------------------------------------------------------------------------

/// Forwards notifications to a receiver owned by the UI.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver the UI polls with `try_recv`.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        let notification = Notification {
            kind,
            message: message.to_string(),
        };
        if let Err(e) = self.tx.try_send(notification) {
            log::warn!("notify: dropping notification ({e})");
        }
    }
}
