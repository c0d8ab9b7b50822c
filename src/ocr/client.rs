//! Recognition client — the async face of an [`OcrEngine`].
//!
//! [`RecognitionClient::recognize`] runs the blocking engine on
//! `tokio::task::spawn_blocking`, forwards only the "recognizing text" phase
//! as an integer percentage, and folds every engine failure (including a
//! panicking engine) into an opaque [`RecognitionFailure`].

use std::sync::Arc;

use thiserror::Error;

use super::engine::{EngineProgress, OcrEngine, RecognitionPhase};

/// Language used when the caller does not pick one.
pub const DEFAULT_LANGUAGE: &str = "eng";

// ---------------------------------------------------------------------------
// RecognitionFailure
// ---------------------------------------------------------------------------

/// Opaque failure of one recognition run.
///
/// The cause is kept for diagnostics only; it is never shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("recognition failed: {cause}")]
pub struct RecognitionFailure {
    cause: String,
}

impl RecognitionFailure {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// Underlying engine / I/O error text.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

// ---------------------------------------------------------------------------
// RecognitionClient
// ---------------------------------------------------------------------------

/// Cheap-to-clone handle on a shared OCR engine plus the recognition language.
#[derive(Clone)]
pub struct RecognitionClient {
    engine: Arc<dyn OcrEngine>,
    language: String,
}

impl std::fmt::Debug for RecognitionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionClient")
            .field("language", &self.language)
            .finish_non_exhaustive()
    }
}

impl RecognitionClient {
    /// Wrap `engine`, recognising in [`DEFAULT_LANGUAGE`].
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self {
            engine,
            language: DEFAULT_LANGUAGE.into(),
        }
    }

    /// Override the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Recognise the text in `image`.
    ///
    /// `on_progress` receives percentages in `0..=100` for the
    /// "recognizing text" phase only, on the blocking worker thread, and is
    /// never called after this future resolves.
    pub async fn recognize<F>(&self, image: Vec<u8>, on_progress: F) -> Result<String, RecognitionFailure>
    where
        F: Fn(u8) + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let language = self.language.clone();

        let joined = tokio::task::spawn_blocking(move || {
            let forward = |event: EngineProgress| {
                if event.phase == RecognitionPhase::RecognizingText {
                    on_progress(to_percent(event.fraction));
                }
            };
            engine.recognize(&image, &language, &forward)
        })
        .await;

        match joined {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(RecognitionFailure::new(e.to_string())),
            Err(e) => Err(RecognitionFailure::new(format!("recognition task aborted: {e}"))),
        }
    }
}

/// Scale an engine fraction in `[0, 1]` to a rounded percentage.
///
/// Out-of-range values are clamped; NaN maps to 0.
pub fn to_percent(fraction: f32) -> u8 {
    if fraction.is_nan() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u8
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::ocr::engine::{MockOcrEngine, OcrError};

    struct PanickingEngine;

    impl OcrEngine for PanickingEngine {
        fn recognize(
            &self,
            _image: &[u8],
            _language: &str,
            _progress: &dyn Fn(EngineProgress),
        ) -> Result<String, OcrError> {
            panic!("engine exploded");
        }
    }

    #[test]
    fn to_percent_scales_and_rounds() {
        assert_eq!(to_percent(0.0), 0);
        assert_eq!(to_percent(0.45), 45);
        assert_eq!(to_percent(0.456), 46);
        assert_eq!(to_percent(1.0), 100);
    }

    #[test]
    fn to_percent_clamps_out_of_range() {
        assert_eq!(to_percent(-0.3), 0);
        assert_eq!(to_percent(1.7), 100);
        assert_eq!(to_percent(f32::NAN), 0);
        assert_eq!(to_percent(f32::INFINITY), 100);
    }

    #[tokio::test]
    async fn only_recognizing_phase_reaches_caller() {
        let engine = MockOcrEngine::ok("text").with_progress(vec![
            EngineProgress::new(RecognitionPhase::LoadingEngine, 0.5),
            EngineProgress::new(RecognitionPhase::InitializingApi, 1.0),
            EngineProgress::new(RecognitionPhase::RecognizingText, 0.0),
            EngineProgress::new(RecognitionPhase::RecognizingText, 0.45),
            EngineProgress::new(RecognitionPhase::RecognizingText, 1.0),
        ]);
        let client = RecognitionClient::new(Arc::new(engine));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let text = client
            .recognize(b"img".to_vec(), move |p| sink.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(text, "text");
        assert_eq!(*seen.lock().unwrap(), vec![0, 45, 100]);
    }

    #[tokio::test]
    async fn default_language_is_eng() {
        let engine = Arc::new(MockOcrEngine::ok(""));
        let client = RecognitionClient::new(Arc::clone(&engine) as Arc<dyn OcrEngine>);

        client.recognize(b"img".to_vec(), |_| {}).await.unwrap();

        assert_eq!(client.language(), "eng");
        assert_eq!(engine.calls()[0].1, "eng");
    }

    #[tokio::test]
    async fn engine_error_becomes_opaque_failure() {
        let engine = MockOcrEngine::err(OcrError::Engine("engine init failed".into()));
        let client = RecognitionClient::new(Arc::new(engine));

        let failure = client.recognize(b"img".to_vec(), |_| {}).await.unwrap_err();

        assert!(failure.cause().contains("engine init failed"));
    }

    #[tokio::test]
    async fn panicking_engine_does_not_crash_caller() {
        let client = RecognitionClient::new(Arc::new(PanickingEngine));

        let failure = client.recognize(b"img".to_vec(), |_| {}).await.unwrap_err();

        assert!(failure.cause().contains("aborted"));
    }
}
