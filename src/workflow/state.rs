use std::collections::BTreeSet;

use crate::{
    document::output::{ItemHandle, OutputItem},
    foundation::core::ContentCategory,
    render::backend::Artifact,
};

/// Mutable record of one item's run, owned by the worker executing it.
#[derive(Clone, Debug)]
pub struct WorkflowState {
    /// 1-based source item index.
    pub index: usize,
    /// Set by the analyze step.
    pub category: Option<ContentCategory>,
    /// Layouts already handed out by the selector.
    pub tried_layouts: BTreeSet<usize>,
    /// Layout chosen by the most recent select step.
    pub current_layout: Option<usize>,
    /// Failed quality checks so far.
    pub attempts: u32,
    /// Render of the source item.
    pub baseline: Option<Artifact>,
    /// Render of the most recently placed output item.
    pub candidate: Option<Artifact>,
    /// Verdict of the most recent comparison.
    pub quality_ok: bool,
    /// Diagnostic from the most recent failed comparison.
    pub feedback: Option<String>,
    /// Slot of this item in the shared output document.
    pub new_item: Option<ItemHandle>,
    /// Content last written through `new_item`.
    pub placed: Option<OutputItem>,
    /// Steps executed by the driver.
    pub steps: u32,
}

impl WorkflowState {
    /// Fresh state for the item at `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            category: None,
            tried_layouts: BTreeSet::new(),
            current_layout: None,
            attempts: 0,
            baseline: None,
            candidate: None,
            quality_ok: false,
            feedback: None,
            new_item: None,
            placed: None,
            steps: 0,
        }
    }

    /// Terminal result of a run that reached `Done`.
    pub fn into_result(self) -> ItemResult {
        let success = self.quality_ok;
        ItemResult {
            index: self.index,
            success,
            feedback: if success { None } else { self.feedback },
            attempts: self.attempts,
            layout: self.current_layout,
            failure: (!success).then_some(FailureReason::QualityRejected),
        }
    }
}

/// Why an item did not convert successfully.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "message")]
pub enum FailureReason {
    /// Every permitted attempt failed the quality gate.
    QualityRejected,
    /// The item could not be rendered.
    Render(String),
    /// The run violated a workflow precondition or panicked. The result still carries the
    /// attempts and layout reached before the run stopped.
    Fatal(String),
}

/// Terminal, immutable record emitted once per source item.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemResult {
    /// 1-based source item index.
    pub index: usize,
    /// Whether the produced item passed verification.
    pub success: bool,
    /// Last feedback message when unsuccessful.
    pub feedback: Option<String>,
    /// Failed quality checks.
    pub attempts: u32,
    /// Last layout tried, if selection ran.
    pub layout: Option<usize>,
    /// Failure classification, `None` on success.
    pub failure: Option<FailureReason>,
}

impl ItemResult {
    /// Return `true` for results that must fail the job.
    pub fn is_fatal(&self) -> bool {
        matches!(self.failure, Some(FailureReason::Fatal(_)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/workflow/state.rs"]
mod tests;
