//! Render model: what the window shows for a given [`WorkflowState`].

use super::preview::PreviewId;
use super::state::{ConversionResult, WorkflowPhase, WorkflowState};

/// Snapshot of the visible UI, computed under the state lock and rendered
/// after it is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowView {
    pub phase: WorkflowPhase,
    /// Name of the selected file.
    pub file_name: Option<String>,
    /// Preview to draw; `None` shows the placeholder.
    pub preview: Option<PreviewId>,
    /// Progress percentage, present only while non-zero.
    pub progress: Option<u8>,
    /// Extracted text block, present only when non-empty.
    pub text: Option<String>,
    /// Whether the copy action is enabled.
    pub can_copy: bool,
    /// Whether the convert button accepts clicks.
    pub can_convert: bool,
    pub convert_label: &'static str,
}

impl WorkflowView {
    pub fn from_state(state: &WorkflowState) -> Self {
        let selection = state.selection();

        let text = match state.result() {
            Some(ConversionResult::Text(text)) | Some(ConversionResult::Failure(text))
                if !text.is_empty() =>
            {
                Some(text.clone())
            }
            _ => None,
        };

        Self {
            phase: state.phase(),
            file_name: selection.map(|s| s.source().display_name()),
            preview: selection.and_then(|s| s.preview_id()),
            progress: (state.progress() > 0).then_some(state.progress()),
            text,
            can_copy: state.copyable_text().is_ok(),
            // Idle stays clickable so the user gets the "upload" warning.
            can_convert: !state.phase().is_busy(),
            convert_label: if selection.is_some() {
                "Convert to Text"
            } else {
                "Upload an Image"
            },
        }
    }
}
