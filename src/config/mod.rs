//! Configuration module for Image-to-Text.
//!
//! Provides `AppConfig` (top-level settings), the OCR and UI sub-configs,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, OcrConfig, UiConfig};
