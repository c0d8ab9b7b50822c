//! Image-to-Text — extract the text embedded in an image with an OCR engine.
//!
//! The crate is split into leaf services and one coordinator:
//!
//! * [`ocr`]       — OCR engine trait, the Tesseract CLI engine and the
//!   progress-scaling [`ocr::RecognitionClient`].
//! * [`clipboard`] — single-attempt copy to the system clipboard.
//! * [`notify`]    — injected notifier for transient success / error toasts.
//! * [`workflow`]  — the conversion state machine that sequences
//!   selection → read → recognize → ready.
//! * [`app`]       — the eframe window rendering the workflow state.
//! * [`config`]    — `settings.toml` persistence.

pub mod app;
pub mod clipboard;
pub mod config;
pub mod notify;
pub mod ocr;
pub mod workflow;
