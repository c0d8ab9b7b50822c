//! OCR module.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                RecognitionClient (async)               │
//! │   spawn_blocking ─▶ OcrEngine::recognize(bytes, lang)  │
//! │                          │                             │
//! │            EngineProgress { phase, fraction }          │
//! │                          │                             │
//! │   "recognizing text" only ─▶ ×100, rounded ─▶ caller   │
//! └────────────────────────────────────────────────────────┘
//!          ▲                               ▲
//!   TesseractEngine (CLI)           MissingEngine (not installed)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use image_to_text::config::OcrConfig;
//! use image_to_text::ocr::{RecognitionClient, TesseractEngine};
//!
//! # async fn demo() {
//! let engine = TesseractEngine::new(&OcrConfig::default())
//!     .expect("tesseract is not installed");
//! let client = RecognitionClient::new(Arc::new(engine));
//!
//! let bytes = std::fs::read("scan.png").unwrap();
//! let text = client
//!     .recognize(bytes, |percent| println!("{percent}%"))
//!     .await
//!     .unwrap();
//! println!("{text}");
//! # }
//! ```

pub mod client;
pub mod engine;
pub mod tesseract;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use client::{to_percent, RecognitionClient, RecognitionFailure, DEFAULT_LANGUAGE};
pub use engine::{EngineProgress, OcrEngine, OcrError, RecognitionPhase};
pub use tesseract::{MissingEngine, TesseractEngine};

#[cfg(test)]
pub use engine::MockOcrEngine;
