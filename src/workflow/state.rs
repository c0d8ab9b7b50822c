//! Workflow state machine and shared workflow state.
//!
//! [`WorkflowPhase`] names where the conversion workflow is; [`WorkflowState`]
//! holds everything the UI needs (selection, progress, result) and owns every
//! transition.  Asynchronous work reports back through
//! [`WorkflowState::apply_progress`] and [`WorkflowState::complete`], which
//! check the run's [`RunToken`] so a superseded run can never touch the state.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<WorkflowState>>`, cheap to
//! clone and safe to share between the UI thread and runtime tasks.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::preview::{PreviewHandle, PreviewId};

/// Result text shown when recognition fails.  The real cause is only logged.
pub const FAILURE_MESSAGE: &str = "Failed to extract text.";

// ---------------------------------------------------------------------------
// ImageSource
// ---------------------------------------------------------------------------

/// Where the selected file's bytes come from.
///
/// No content-type validation happens here; whatever the user picked is
/// handed to the OCR engine as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A file on disk, read when conversion starts.
    Path(PathBuf),
    /// An in-memory payload (e.g. dropped onto the window).
    Bytes { name: String, data: Arc<[u8]> },
}

impl ImageSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        ImageSource::Path(path.into())
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        ImageSource::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// File name for display purposes.
    pub fn display_name(&self) -> String {
        match self {
            ImageSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read the full payload.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            ImageSource::Path(path) => tokio::fs::read(path).await,
            ImageSource::Bytes { data, .. } => Ok(data.to_vec()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Identity of one selection.  Every pick gets a fresh token, even when the
/// same file is picked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionToken(u64);

/// Identity of one recognition run, tied to the selection it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunToken {
    selection: SelectionToken,
    run: u64,
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.selection.0, self.run)
    }
}

// ---------------------------------------------------------------------------
// ImageSelection
// ---------------------------------------------------------------------------

/// The file the user picked plus its preview.  Replaced wholesale, never
/// mutated; dropping it releases the preview.
#[derive(Debug)]
pub struct ImageSelection {
    token: SelectionToken,
    source: ImageSource,
    preview: Option<PreviewHandle>,
}

impl ImageSelection {
    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn preview_id(&self) -> Option<PreviewId> {
        self.preview.as_ref().map(PreviewHandle::id)
    }
}

// ---------------------------------------------------------------------------
// WorkflowPhase
// ---------------------------------------------------------------------------

/// States of the conversion workflow.
///
/// ```text
/// Idle ──select──▶ Selected ──start──▶ Running ──done──▶ Completed
///                     ▲                                     │
/// any ──select────────┘                   Completed ──start─┘ (re-run)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    /// No file selected.
    #[default]
    Idle,
    /// A file is selected and no run has started for it.
    Selected,
    /// Recognition is in flight for the current selection.
    Running,
    /// The last run for the current selection finished (text or failure).
    Completed,
}

impl WorkflowPhase {
    /// `true` while recognition is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowPhase::Running)
    }
}

// ---------------------------------------------------------------------------
// ConversionResult
// ---------------------------------------------------------------------------

/// Outcome of one recognition run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionResult {
    /// Recognised text, possibly empty.
    Text(String),
    /// Generic user-facing failure message.
    Failure(String),
}

impl ConversionResult {
    pub fn failed() -> Self {
        ConversionResult::Failure(FAILURE_MESSAGE.into())
    }

    /// Recognised text, if the run succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            ConversionResult::Text(text) => Some(text),
            ConversionResult::Failure(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowError
// ---------------------------------------------------------------------------

/// Commands rejected by the current state.  None of these change state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("no image selected")]
    NoSelection,

    #[error("a recognition run is already in flight")]
    AlreadyRunning,

    #[error("no extracted text to copy")]
    NothingToCopy,
}

// ---------------------------------------------------------------------------
// WorkflowState
// ---------------------------------------------------------------------------

/// The single source of truth for the UI.
///
/// Invariants:
/// - `result` is `None` while no selection exists and right after a new
///   selection.
/// - `progress` is 0 until a run starts for the current selection, and never
///   decreases while that run is in flight.
#[derive(Debug, Default)]
pub struct WorkflowState {
    phase: WorkflowPhase,
    selection: Option<ImageSelection>,
    progress: u8,
    result: Option<ConversionResult>,
    active_run: Option<RunToken>,
    selections_made: u64,
    runs_started: u64,
}

impl WorkflowState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> WorkflowPhase {
        self.phase
    }

    pub fn selection(&self) -> Option<&ImageSelection> {
        self.selection.as_ref()
    }

    /// Percentage in `0..=100`.
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result(&self) -> Option<&ConversionResult> {
        self.result.as_ref()
    }

    /// Token of the run currently allowed to report, if any.
    pub fn active_run(&self) -> Option<RunToken> {
        self.active_run
    }

    /// Replace the selection, from any phase.
    ///
    /// Any in-flight run loses its right to report.  The previous selection
    /// is dropped here, which releases its preview.
    pub fn select(&mut self, source: ImageSource, preview: Option<PreviewHandle>) -> SelectionToken {
        self.selections_made += 1;
        let token = SelectionToken(self.selections_made);

        self.selection = Some(ImageSelection {
            token,
            source,
            preview,
        });
        self.phase = WorkflowPhase::Selected;
        self.progress = 0;
        self.result = None;
        self.active_run = None;
        token
    }

    /// Enter `Running` for the current selection.
    ///
    /// Returns the new run's token and the source to read.  A previous result
    /// stays visible until this run replaces it.
    pub fn begin_run(&mut self) -> Result<(RunToken, ImageSource), WorkflowError> {
        let selection = self.selection.as_ref().ok_or(WorkflowError::NoSelection)?;
        if self.phase == WorkflowPhase::Running {
            return Err(WorkflowError::AlreadyRunning);
        }

        self.runs_started += 1;
        let run = RunToken {
            selection: selection.token,
            run: self.runs_started,
        };
        let source = selection.source.clone();

        self.phase = WorkflowPhase::Running;
        self.progress = 0;
        self.active_run = Some(run);
        Ok((run, source))
    }

    /// Apply a progress report from `run`.
    ///
    /// The value is clamped to 100 and never lowers the current progress.
    /// Returns `false` (and changes nothing) when `run` is not the active run.
    pub fn apply_progress(&mut self, run: RunToken, percent: u8) -> bool {
        if !self.accepts(run) {
            return false;
        }
        self.progress = self.progress.max(percent.min(100));
        true
    }

    /// Apply the outcome of `run` and move to `Completed`.
    ///
    /// Applied at most once per run.  Returns `false` for stale or repeated
    /// completions.
    pub fn complete(&mut self, run: RunToken, result: ConversionResult) -> bool {
        if !self.accepts(run) {
            return false;
        }
        self.result = Some(result);
        self.phase = WorkflowPhase::Completed;
        self.active_run = None;
        true
    }

    /// Text that `copy_result` may hand to the clipboard.
    pub fn copyable_text(&self) -> Result<&str, WorkflowError> {
        if self.phase != WorkflowPhase::Completed {
            return Err(WorkflowError::NothingToCopy);
        }
        match self.result.as_ref().and_then(ConversionResult::text) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(WorkflowError::NothingToCopy),
        }
    }

    /// Drop the selection (releasing its preview) and return to `Idle`.
    pub fn clear(&mut self) {
        self.selection = None;
        self.phase = WorkflowPhase::Idle;
        self.progress = 0;
        self.result = None;
        self.active_run = None;
    }

    fn accepts(&self, run: RunToken) -> bool {
        self.phase == WorkflowPhase::Running && self.active_run == Some(run)
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`WorkflowState`].
///
/// Lock with [`lock_state`] for a short critical section; do **not** hold the
/// lock across `.await` points.
pub type SharedState = Arc<Mutex<WorkflowState>>;

pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(WorkflowState::new()))
}

/// Lock the shared state, recovering the data from a poisoned lock.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, WorkflowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
