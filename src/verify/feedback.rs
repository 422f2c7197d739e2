use crate::workflow::state::WorkflowState;

/// Record a failed quality check: write the diagnostic and count the attempt.
pub fn record_failure(state: &mut WorkflowState) {
    let layout = state
        .current_layout
        .map_or_else(|| "<none>".to_string(), |l| l.to_string());
    state.feedback = Some(format!("item {} failed layout {layout}", state.index));
    state.attempts += 1;
}

#[cfg(test)]
#[path = "../../tests/unit/verify/feedback.rs"]
mod tests;
