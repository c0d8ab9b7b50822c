//! Conversion workflow — sequences selection → read → recognize → ready.
//!
//! [`ConversionWorkflow`] owns the [`SharedState`] and exposes the three user
//! commands.  Commands run on the caller's thread and only take the state lock
//! briefly; the slow parts (file read, OCR, clipboard write) are spawned onto
//! the tokio runtime and report back through token-checked transitions.
//!
//! # Run flow
//!
//! ```text
//! select_file(source)
//!   └─▶ acquire preview, replace selection          [Selected]
//!
//! start_conversion()
//!   ├─ no selection → notify "Please upload an image."   (no change)
//!   └─▶ begin_run → spawn task                       [Running]
//!         ├─ read bytes
//!         ├─ RecognitionClient::recognize
//!         │     └─ progress(run, %)   (dropped if run is stale)
//!         └─ complete(run, Text | Failure)           [Completed]
//!
//! copy_result()
//!   └─▶ spawn_blocking(clipboard.copy) → notify success | log failure
//! ```
//!
//! There is no cancellation: a superseded run keeps going, and its reports
//! are discarded when they reach the state.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::clipboard::ClipboardBridge;
use crate::notify::{NotificationKind, Notifier, COPY_SUCCESS_MESSAGE, NO_SELECTION_MESSAGE};
use crate::ocr::{RecognitionClient, RecognitionFailure};

use super::preview::{PreviewHandle, PreviewStore};
use super::state::{
    lock_state, new_shared_state, ConversionResult, ImageSource, RunToken, SelectionToken,
    SharedState, WorkflowError,
};
use super::view::WorkflowView;

// ---------------------------------------------------------------------------
// ConversionWorkflow
// ---------------------------------------------------------------------------

/// Drives the image-to-text workflow.
///
/// Cheap to clone; clones share the same state and collaborators.
#[derive(Clone)]
pub struct ConversionWorkflow {
    state: SharedState,
    client: RecognitionClient,
    clipboard: Arc<dyn ClipboardBridge>,
    notifier: Arc<dyn Notifier>,
    previews: Arc<dyn PreviewStore>,
    runtime: Handle,
}

impl ConversionWorkflow {
    /// Create a workflow in the `Idle` phase.
    ///
    /// # Arguments
    ///
    /// * `runtime`   — runtime that runs recognition and clipboard tasks.
    /// * `client`    — recognition client wrapping the OCR engine.
    /// * `clipboard` — clipboard bridge used by [`copy_result`](Self::copy_result).
    /// * `notifier`  — sink for the user-visible messages.
    /// * `previews`  — store that builds preview resources for selections.
    pub fn new(
        runtime: Handle,
        client: RecognitionClient,
        clipboard: Arc<dyn ClipboardBridge>,
        notifier: Arc<dyn Notifier>,
        previews: Arc<dyn PreviewStore>,
    ) -> Self {
        Self {
            state: new_shared_state(),
            client,
            clipboard,
            notifier,
            previews,
            runtime,
        }
    }

    /// Handle on the shared state, for readers.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Render model of the current state.
    pub fn view(&self) -> WorkflowView {
        WorkflowView::from_state(&lock_state(&self.state))
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Make `source` the current selection.  Valid from every phase.
    pub fn select_file(&self, source: ImageSource) -> SelectionToken {
        // Build the preview before locking; decoding can take a while.
        let preview = PreviewHandle::acquire(&self.previews, &source);
        let name = source.display_name();

        let token = lock_state(&self.state).select(source, preview);
        log::debug!("workflow: selected {name:?} → Selected");
        token
    }

    /// Start recognising the current selection.
    ///
    /// Without a selection this notifies the user and returns
    /// [`WorkflowError::NoSelection`]; while a run is in flight it returns
    /// [`WorkflowError::AlreadyRunning`].  Neither case changes state.
    pub fn start_conversion(&self) -> Result<JoinHandle<()>, WorkflowError> {
        let begun = lock_state(&self.state).begin_run();

        let (run, source) = match begun {
            Ok(begun) => begun,
            Err(WorkflowError::NoSelection) => {
                log::warn!("workflow: conversion requested without a selection");
                self.notifier
                    .notify(NotificationKind::Error, NO_SELECTION_MESSAGE);
                return Err(WorkflowError::NoSelection);
            }
            Err(e) => {
                log::debug!("workflow: start_conversion ignored ({e})");
                return Err(e);
            }
        };

        log::debug!("workflow: run {run} → Running");
        let task = run_conversion(Arc::clone(&self.state), self.client.clone(), run, source);
        Ok(self.runtime.spawn(task))
    }

    /// Copy the extracted text to the clipboard.
    ///
    /// Only valid in `Completed` with non-empty text; otherwise returns
    /// [`WorkflowError::NothingToCopy`].  Success is notified; failure is
    /// logged only.  Never changes workflow state.
    pub fn copy_result(&self) -> Result<JoinHandle<()>, WorkflowError> {
        let text = lock_state(&self.state).copyable_text()?.to_string();

        let clipboard = Arc::clone(&self.clipboard);
        let notifier = Arc::clone(&self.notifier);

        Ok(self.runtime.spawn(async move {
            let copied = tokio::task::spawn_blocking(move || clipboard.copy(&text)).await;
            match copied {
                Ok(Ok(())) => {
                    log::debug!("workflow: result copied to clipboard");
                    notifier.notify(NotificationKind::Success, COPY_SUCCESS_MESSAGE);
                }
                Ok(Err(e)) => log::warn!("workflow: failed to copy text: {e}"),
                Err(e) => log::warn!("workflow: clipboard task panicked: {e}"),
            }
        }))
    }

    /// Release the selection and its preview.  Called on teardown.
    pub fn shutdown(&self) {
        lock_state(&self.state).clear();
        log::debug!("workflow: shut down → Idle");
    }
}

// ---------------------------------------------------------------------------
// Run task
// ---------------------------------------------------------------------------

async fn run_conversion(
    state: SharedState,
    client: RecognitionClient,
    run: RunToken,
    source: ImageSource,
) {
    let outcome = match source.read().await {
        Ok(bytes) => {
            let progress_state = Arc::clone(&state);
            client
                .recognize(bytes, move |percent| {
                    if !lock_state(&progress_state).apply_progress(run, percent) {
                        log::debug!("workflow: dropped stale progress {percent}% of run {run}");
                    }
                })
                .await
        }
        Err(e) => Err(RecognitionFailure::new(format!(
            "cannot read {}: {e}",
            source.display_name()
        ))),
    };

    let result = match outcome {
        Ok(text) => ConversionResult::Text(text),
        Err(failure) => {
            log::error!("workflow: run {run} failed: {failure}");
            ConversionResult::failed()
        }
    };

    if lock_state(&state).complete(run, result) {
        log::debug!("workflow: run {run} → Completed");
    } else {
        log::debug!("workflow: discarded stale result of run {run}");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
