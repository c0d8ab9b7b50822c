//! Conversion workflow module.
//!
//! This module owns the image → OCR → text workflow and exposes the shared
//! state that the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! UI thread                        tokio runtime
//! ─────────                        ─────────────
//! select_file ──▶ WorkflowState::select          (preview acquired/released)
//! start_conversion ──▶ begin_run ──spawn──▶ read bytes
//!                                            └─▶ RecognitionClient::recognize
//!                        apply_progress(run) ◀──── progress %
//!                        complete(run)       ◀──── Text | Failure
//! copy_result ──spawn──────────────────────▶ ClipboardBridge::copy ─▶ Notifier
//!
//! SharedState (Arc<Mutex<WorkflowState>>) ◀── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_to_text::clipboard::SystemClipboard;
//! use image_to_text::notify::ChannelNotifier;
//! use image_to_text::ocr::{MissingEngine, RecognitionClient};
//! use image_to_text::workflow::{ConversionWorkflow, ImageSource, NoPreview};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (notifier, _toasts) = ChannelNotifier::channel(16);
//!     let workflow = ConversionWorkflow::new(
//!         tokio::runtime::Handle::current(),
//!         RecognitionClient::new(Arc::new(MissingEngine::new("demo"))),
//!         Arc::new(SystemClipboard),
//!         Arc::new(notifier),
//!         Arc::new(NoPreview),
//!     );
//!
//!     workflow.select_file(ImageSource::from_path("scan.png"));
//!     workflow.start_conversion().unwrap().await.unwrap();
//!     println!("{:?}", workflow.view().text);
//! }
//! ```

pub mod preview;
pub mod runner;
pub mod state;
pub mod view;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use preview::{NoPreview, PreviewHandle, PreviewId, PreviewStore};
pub use runner::ConversionWorkflow;
pub use state::{
    lock_state, new_shared_state, ConversionResult, ImageSelection, ImageSource, RunToken,
    SelectionToken, SharedState, WorkflowError, WorkflowPhase, WorkflowState, FAILURE_MESSAGE,
};
pub use view::WorkflowView;
