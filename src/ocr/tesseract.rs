//! Tesseract OCR engine driven through its command-line binary.
//!
//! The image payload is piped to `tesseract stdin stdout -l <lang>` so no
//! temporary files are written.  The CLI does not stream progress, so the
//! engine reports phase boundaries: loading while the process starts, then
//! `0.0` / `1.0` of [`RecognitionPhase::RecognizingText`] around the run.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::config::OcrConfig;

use super::engine::{EngineProgress, OcrEngine, OcrError, RecognitionPhase};

const DEFAULT_BINARY: &str = "tesseract";

// ---------------------------------------------------------------------------
// TesseractEngine
// ---------------------------------------------------------------------------

/// Production OCR engine wrapping the `tesseract` CLI.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    tessdata_path: Option<PathBuf>,
    version: String,
}

impl TesseractEngine {
    /// Probe the configured binary with `--version` and build the engine.
    ///
    /// # Errors
    ///
    /// - [`OcrError::EngineUnavailable`] — the binary is missing or exits
    ///   with a failure status.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let binary = config
            .binary_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BINARY));

        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .map_err(|e| OcrError::EngineUnavailable(format!("{}: {e}", binary.display())))?;

        if !output.status.success() {
            return Err(OcrError::EngineUnavailable(format!(
                "{} --version exited with {}",
                binary.display(),
                output.status
            )));
        }

        // Older releases print the banner on stderr.
        let version = parse_version(&String::from_utf8_lossy(&output.stdout))
            .or_else(|| parse_version(&String::from_utf8_lossy(&output.stderr)))
            .unwrap_or_else(|| "unknown".into());

        log::info!("ocr: tesseract {version} at {}", binary.display());

        Ok(Self {
            binary,
            tessdata_path: config.tessdata_path.clone(),
            version,
        })
    }

    /// Version string reported by the binary (e.g. `"5.3.4"`).
    pub fn version(&self) -> &str {
        &self.version
    }

    fn command(&self, language: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stdin")
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(tessdata) = &self.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata);
        }
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(
        &self,
        image: &[u8],
        language: &str,
        progress: &dyn Fn(EngineProgress),
    ) -> Result<String, OcrError> {
        let start = Instant::now();
        progress(EngineProgress::new(RecognitionPhase::LoadingEngine, 0.0));

        let mut child = self
            .command(language)
            .spawn()
            .map_err(|e| OcrError::Spawn(format!("{}: {e}", self.binary.display())))?;

        progress(EngineProgress::new(RecognitionPhase::LoadingEngine, 1.0));

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::Io("engine stdin was not captured".into()))?;

        progress(EngineProgress::new(RecognitionPhase::RecognizingText, 0.0));

        // Feed stdin from a separate thread so a chatty engine cannot fill its
        // stdout pipe while we are still writing.
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || {
                let mut stdin = stdin;
                stdin.write_all(image)
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|e| OcrError::Io(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(first_error_line(&stderr, output.status)));
        }
        written.map_err(|e| OcrError::Io(e.to_string()))?;

        let raw = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::InvalidOutput(e.to_string()))?;

        progress(EngineProgress::new(RecognitionPhase::RecognizingText, 1.0));

        let text = clean_output(&raw);
        log::debug!(
            "ocr: recognised {} chars in {} ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// MissingEngine — stand-in when the binary cannot be found
// ---------------------------------------------------------------------------

/// Engine used when Tesseract is not installed; every run fails with the
/// reason captured at startup so the app still launches.
#[derive(Debug, Clone)]
pub struct MissingEngine {
    reason: String,
}

impl MissingEngine {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl OcrEngine for MissingEngine {
    fn recognize(
        &self,
        _image: &[u8],
        _language: &str,
        progress: &dyn Fn(EngineProgress),
    ) -> Result<String, OcrError> {
        progress(EngineProgress::new(RecognitionPhase::LoadingEngine, 0.0));
        Err(OcrError::EngineUnavailable(self.reason.clone()))
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Strip the trailing page separator (form feed) and blank lines the CLI
/// appends after the recognised text.
fn clean_output(raw: &str) -> String {
    raw.trim_end().to_string()
}

/// `"tesseract 5.3.4\n leptonica-1.82.0 ..."` → `"5.3.4"`.
fn parse_version(banner: &str) -> Option<String> {
    let first = banner.lines().next()?.trim();
    let version = first.strip_prefix("tesseract")?.trim().trim_start_matches('v');
    (!version.is_empty()).then(|| version.to_string())
}

fn first_error_line(stderr: &str, status: std::process::ExitStatus) -> String {
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("tesseract exited with {status}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn clean_output_strips_page_separator() {
        assert_eq!(clean_output("Hello\nWorld\n\u{c}"), "Hello\nWorld");
        assert_eq!(clean_output("\u{c}"), "");
        assert_eq!(clean_output(""), "");
    }

    #[test]
    fn clean_output_keeps_leading_layout() {
        assert_eq!(clean_output("  indented\n"), "  indented");
    }

    #[test]
    fn parse_version_reads_banner() {
        assert_eq!(
            parse_version("tesseract 5.3.4\n leptonica-1.82.0\n"),
            Some("5.3.4".into())
        );
        assert_eq!(parse_version("tesseract v4.1.1"), Some("4.1.1".into()));
        assert_eq!(parse_version("something else"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn missing_binary_is_engine_unavailable() {
        let config = OcrConfig {
            binary_path: Some(PathBuf::from("/nonexistent/bin/tesseract")),
            ..OcrConfig::default()
        };
        let result = TesseractEngine::new(&config);
        assert!(
            matches!(result, Err(OcrError::EngineUnavailable(_))),
            "expected EngineUnavailable, got: {result:?}"
        );
    }

    #[test]
    fn missing_engine_fails_every_run_without_recognizing_progress() {
        let engine = MissingEngine::new("tesseract not found");
        let seen = Mutex::new(Vec::new());

        let err = engine
            .recognize(b"img", "eng", &|p| seen.lock().unwrap().push(p.phase))
            .unwrap_err();

        assert!(err.to_string().contains("tesseract not found"));
        assert!(!seen
            .into_inner()
            .unwrap()
            .contains(&RecognitionPhase::RecognizingText));
    }

    // ── Fake binary ──────────────────────────────────────────────────────

    /// Write an executable `tesseract` stand-in that answers `--version` and
    /// then runs `body`.
    #[cfg(unix)]
    fn fake_tesseract(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("tesseract");
        let script = format!(
            "#!/bin/sh\nif [ \"$1\" = \"--version\" ]; then\n  echo 'tesseract 5.3.4'\n  exit 0\nfi\n{body}\n"
        );
        std::fs::write(&path, script).expect("write script");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }

    /// A script that records its args, `TESSDATA_PREFIX` (as `env`) and stdin into
    /// `dir`, then prints two lines plus the page separator.
    #[cfg(unix)]
    fn recording_tesseract(dir: &Path) -> PathBuf {
        let body = format!(
            r#"echo "$@" > '{dir}/args'
printf '%s' "$TESSDATA_PREFIX" > '{dir}/env'
cat > '{dir}/stdin'
printf 'Hello\nWorld\n\f'"#,
            dir = dir.display()
        );
        fake_tesseract(dir, &body)
    }

    #[cfg(unix)]
    fn engine_for(binary: PathBuf, tessdata_path: Option<PathBuf>) -> TesseractEngine {
        let config = OcrConfig {
            binary_path: Some(binary),
            tessdata_path,
            ..OcrConfig::default()
        };
        // A freshly written script can report ETXTBSY while another test
        // thread is mid-fork.
        for _ in 0..5 {
            if let Ok(engine) = TesseractEngine::new(&config) {
                return engine;
            }
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        TesseractEngine::new(&config).expect("fake tesseract should start")
    }

    #[cfg(unix)]
    #[test]
    fn recognize_pipes_image_and_trims_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let engine = engine_for(recording_tesseract(dir.path()), None);
        assert_eq!(engine.version(), "5.3.4");

        let image = vec![0xA5u8; 2 * 1024 * 1024];
        let seen = Mutex::new(Vec::new());

        let text = engine
            .recognize(&image, "eng", &|p| seen.lock().unwrap().push((p.phase, p.fraction)))
            .expect("recognize");

        assert_eq!(text, "Hello\nWorld");
        assert_eq!(
            std::fs::read(dir.path().join("stdin")).expect("stdin copy"),
            image
        );
        assert_eq!(
            seen.into_inner().unwrap(),
            vec![
                (RecognitionPhase::LoadingEngine, 0.0),
                (RecognitionPhase::LoadingEngine, 1.0),
                (RecognitionPhase::RecognizingText, 0.0),
                (RecognitionPhase::RecognizingText, 1.0),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn recognize_passes_language_flag() {
        let dir = tempfile::tempdir().expect("temp dir");
        let engine = engine_for(recording_tesseract(dir.path()), None);

        engine.recognize(b"img", "eng", &|_| {}).expect("recognize");

        let args = std::fs::read_to_string(dir.path().join("args")).expect("args");
        assert_eq!(args.trim(), "stdin stdout -l eng");
    }

    #[cfg(unix)]
    #[test]
    fn tessdata_path_is_exported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let tessdata = dir.path().join("tessdata");
        let engine = engine_for(recording_tesseract(dir.path()), Some(tessdata.clone()));

        engine.recognize(b"img", "eng", &|_| {}).expect("recognize");

        let exported = std::fs::read_to_string(dir.path().join("env")).expect("env");
        assert_eq!(PathBuf::from(exported), tessdata);
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_with_large_input_reports_first_stderr_line() {
        let dir = tempfile::tempdir().expect("temp dir");
        let binary = fake_tesseract(
            dir.path(),
            "echo '' >&2\necho 'Error in pixReadMem: Unknown format' >&2\necho 'second line' >&2\nexit 1",
        );
        let engine = engine_for(binary, None);
        let image = vec![0u8; 8 * 1024 * 1024];
        let seen = Mutex::new(Vec::new());

        let result = engine.recognize(&image, "eng", &|p| seen.lock().unwrap().push(p));

        match result {
            Err(OcrError::Engine(message)) => {
                assert_eq!(message, "Error in pixReadMem: Unknown format")
            }
            other => panic!("expected Engine error, got: {other:?}"),
        }
        assert!(!seen
            .into_inner()
            .unwrap()
            .iter()
            .any(|p| p.phase == RecognitionPhase::RecognizingText && p.fraction == 1.0));
    }

    #[cfg(unix)]
    #[test]
    fn silent_failure_reports_exit_status() {
        let dir = tempfile::tempdir().expect("temp dir");
        let engine = engine_for(fake_tesseract(dir.path(), "cat > /dev/null\nexit 3"), None);

        let err = engine.recognize(b"img", "eng", &|_| {}).unwrap_err();

        assert!(
            matches!(&err, OcrError::Engine(m) if m.contains("exited")),
            "got: {err:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_output_is_invalid_output() {
        let dir = tempfile::tempdir().expect("temp dir");
        let engine = engine_for(
            fake_tesseract(dir.path(), "cat > /dev/null\nprintf '\\377\\376'"),
            None,
        );

        let err = engine.recognize(b"img", "eng", &|_| {}).unwrap_err();

        assert!(matches!(err, OcrError::InvalidOutput(_)), "got: {err:?}");
    }
}
