//! Core OCR engine trait, progress events and errors.
//!
//! # Overview
//!
//! [`OcrEngine`] is the interface used by the recognition client.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn OcrEngine>` and invoked on the blocking thread pool.
//!
//! Engines report their own progress as a sequence of [`EngineProgress`]
//! events, each tagged with the [`RecognitionPhase`] it belongs to.  Only the
//! [`RecognitionPhase::RecognizingText`] events are surfaced to the user; the
//! other phases exist so engines can describe warm-up work honestly.
//!
//! [`MockOcrEngine`] (available under `#[cfg(test)]`) replays a scripted
//! progress sequence and returns a pre-configured response.

use thiserror::Error;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from an OCR engine.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The engine binary or its language data is not installed.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// The engine process could not be started.
    #[error("cannot start OCR engine: {0}")]
    Spawn(String),

    /// Piping the image into the engine failed.
    #[error("OCR engine I/O failed: {0}")]
    Io(String),

    /// The engine ran but rejected the input.
    #[error("OCR engine error: {0}")]
    Engine(String),

    /// The engine produced output that is not valid UTF-8 text.
    #[error("OCR engine produced invalid output: {0}")]
    InvalidOutput(String),
}

// ---------------------------------------------------------------------------
// Progress events
// ---------------------------------------------------------------------------

/// Phases an engine moves through during one recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionPhase {
    /// Engine code and language data are being loaded.
    LoadingEngine,
    /// The engine API is being initialised for the requested language.
    InitializingApi,
    /// Text recognition proper.  The only phase that drives user progress.
    RecognizingText,
}

impl RecognitionPhase {
    /// Status label as reported by the engine.
    pub fn label(&self) -> &'static str {
        match self {
            RecognitionPhase::LoadingEngine => "loading tesseract core",
            RecognitionPhase::InitializingApi => "initializing api",
            RecognitionPhase::RecognizingText => "recognizing text",
        }
    }
}

/// One self-reported progress event: `fraction` is in `[0, 1]` for `phase`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineProgress {
    pub phase: RecognitionPhase,
    pub fraction: f32,
}

impl EngineProgress {
    pub fn new(phase: RecognitionPhase, fraction: f32) -> Self {
        Self { phase, fraction }
    }
}

// ---------------------------------------------------------------------------
// OcrEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for OCR engines.
///
/// # Contract
///
/// - `image` is the raw file payload as read from disk; the engine decides
///   whether it can decode it.
/// - `progress` may be called any number of times before the method returns
///   and never afterwards.
/// - Calls block; callers run them on `tokio::task::spawn_blocking`.
pub trait OcrEngine: Send + Sync {
    /// Recognise the text in `image` using `language` data.
    fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: &dyn Fn(EngineProgress),
    ) -> Result<String, OcrError>;
}

// Compile-time assertion: Box<dyn OcrEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn OcrEngine>) {}
};

// ---------------------------------------------------------------------------
// MockOcrEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that replays scripted progress and returns a fixed response.
#[cfg(test)]
pub struct MockOcrEngine {
    script: Vec<EngineProgress>,
    response: Result<String, OcrError>,
    calls: std::sync::Mutex<Vec<(Vec<u8>, String)>>,
}

#[cfg(test)]
impl MockOcrEngine {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            script: Vec::new(),
            response: Ok(text.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: OcrError) -> Self {
        Self {
            script: Vec::new(),
            response: Err(error),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Emit `script` through the progress callback before responding.
    pub fn with_progress(mut self, script: Vec<EngineProgress>) -> Self {
        self.script = script;
        self
    }

    /// Every `(image, language)` pair the engine was called with.
    pub fn calls(&self) -> Vec<(Vec<u8>, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl OcrEngine for MockOcrEngine {
    fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: &dyn Fn(EngineProgress),
    ) -> Result<String, OcrError> {
        self.calls
            .lock()
            .unwrap()
            .push((image.to_vec(), language.to_string()));
        for event in &self.script {
            progress(*event);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
