use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use crate::{
    analyze::{classify::classify, select::select_layout},
    document::model::{SourceItem, TemplateCatalog},
    document::output::SharedDocument,
    foundation::core::{ContentCategory, MAX_ATTEMPTS},
    foundation::error::{DeckError, DeckResult},
    place::strategy::{PlacementInput, PlacementRegistry},
    render::backend::{Artifact, RenderBackend},
    verify::{
        feedback::record_failure,
        gate::{diff_bounds, pixels_match},
        judge::Judge,
    },
    workflow::state::{FailureReason, ItemResult, WorkflowState},
};

/// Steps executed per attempt: select, place, render, compare, feedback.
pub const STEPS_PER_ATTEMPT: u32 = 5;

/// Workflow states of one item's run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Classify the item and render its baseline.
    Analyze,
    /// Pick the next untried layout.
    Select,
    /// Run the placement strategy registered for the category.
    Place(ContentCategory),
    /// Render the placed item.
    Render,
    /// Compare baseline and candidate.
    Compare,
    /// Record the failure and decide whether to retry.
    Feedback,
    /// Terminal.
    Done,
}

/// Outcome of a step, consumed by [`transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Unconditional edge.
    Next,
    /// Dispatch to the placement variant of a category.
    Category(ContentCategory),
    /// Quality check passed.
    Pass,
    /// Quality check failed.
    Fail,
    /// Attempts remain.
    Retry,
    /// Attempt budget spent.
    Exhausted,
}

/// Transition table. `None` marks a route the step can never produce.
pub fn transition(step: Step, route: Route) -> Option<Step> {
    match (step, route) {
        (Step::Analyze, Route::Next) => Some(Step::Select),
        (Step::Select, Route::Category(c)) => Some(Step::Place(c)),
        (Step::Place(_), Route::Next) => Some(Step::Render),
        (Step::Render, Route::Next) => Some(Step::Compare),
        (Step::Compare, Route::Pass) => Some(Step::Done),
        (Step::Compare, Route::Fail) => Some(Step::Feedback),
        (Step::Feedback, Route::Retry) => Some(Step::Select),
        (Step::Feedback, Route::Exhausted) => Some(Step::Done),
        _ => None,
    }
}

/// Per-run bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunLimits {
    /// Failed quality checks allowed before giving up.
    pub max_attempts: u32,
    /// Steps a run may execute before it is treated as stuck.
    pub max_steps: u32,
}

impl RunLimits {
    /// Limits with a step budget that exactly fits `max_attempts` full attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            max_steps: 1 + STEPS_PER_ATTEMPT.saturating_mul(max_attempts),
        }
    }
}

impl Default for RunLimits {
    fn default() -> Self {
        Self::new(MAX_ATTEMPTS)
    }
}

/// Everything a run borrows from its job. Shared by all workers.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    /// Template layouts.
    pub catalog: &'a TemplateCatalog,
    /// Shared output document.
    pub document: &'a SharedDocument,
    /// Render adapter.
    pub backend: &'a dyn RenderBackend,
    /// Placement strategies.
    pub placements: &'a PlacementRegistry,
    /// Acceptance hook applied after a pixel match.
    pub judge: &'a dyn Judge,
    /// Attempt and step bounds.
    pub limits: RunLimits,
    /// If set, baseline and candidate artifacts are written here as PNG.
    pub artifact_dir: Option<&'a Path>,
}

/// Run the workflow for one source item and return its terminal result.
///
/// Never fails: errors and panics raised inside the run are folded into the result, which keeps
/// the attempts and layout reached before the run stopped.
#[tracing::instrument(level = "debug", skip(ctx, source), fields(shapes = source.shapes.len()))]
pub fn run_item(ctx: &RunContext<'_>, index: usize, source: &SourceItem) -> ItemResult {
    let mut state = WorkflowState::new(index);
    let outcome = catch_unwind(AssertUnwindSafe(|| drive(ctx, source, &mut state)));
    match outcome {
        Ok(Ok(())) => {
            let result = state.into_result();
            if result.success {
                tracing::info!(item = index, layout = ?result.layout, "item converted");
            } else {
                tracing::warn!(
                    item = index,
                    attempts = result.attempts,
                    feedback = ?result.feedback,
                    "item failed verification"
                );
            }
            result
        }
        Ok(Err(err)) => {
            tracing::warn!(item = index, error = %err, "item run aborted");
            aborted_result(state, err)
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(item = index, panic = %msg, "item run panicked");
            ItemResult {
                index,
                success: false,
                feedback: Some(format!("run panicked: {msg}")),
                attempts: state.attempts,
                layout: state.current_layout,
                failure: Some(FailureReason::Fatal(msg)),
            }
        }
    }
}

/// Drive `state` from `Analyze` to `Done`.
pub fn drive(ctx: &RunContext<'_>, source: &SourceItem, state: &mut WorkflowState) -> DeckResult<()> {
    let mut step = Step::Analyze;
    while step != Step::Done {
        if state.steps >= ctx.limits.max_steps {
            return Err(DeckError::precondition(format!(
                "item {}: step budget of {} exhausted at {step:?}",
                state.index, ctx.limits.max_steps
            )));
        }
        state.steps += 1;

        let route = exec_step(ctx, source, step, state)?;
        let next = transition(step, route).ok_or_else(|| {
            DeckError::precondition(format!(
                "item {}: no transition from {step:?} on {route:?}",
                state.index
            ))
        })?;
        tracing::debug!(item = state.index, ?step, ?route, ?next, "step");
        step = next;
    }
    Ok(())
}

fn exec_step(
    ctx: &RunContext<'_>,
    source: &SourceItem,
    step: Step,
    state: &mut WorkflowState,
) -> DeckResult<Route> {
    match step {
        Step::Analyze => analyze(ctx, source, state),
        Step::Select => select(ctx, state),
        Step::Place(category) => {
            let input = PlacementInput {
                catalog: ctx.catalog,
                document: ctx.document,
                source,
            };
            let strategy = ctx.placements.for_category(category);
            tracing::debug!(item = state.index, strategy = strategy.name(), "placing");
            strategy.place(&input, state)?;
            Ok(Route::Next)
        }
        Step::Render => render(ctx, state),
        Step::Compare => compare(ctx, state),
        Step::Feedback => {
            record_failure(state);
            if state.attempts < ctx.limits.max_attempts {
                Ok(Route::Retry)
            } else {
                Ok(Route::Exhausted)
            }
        }
        Step::Done => Err(DeckError::precondition("Done is terminal and never executed")),
    }
}

fn analyze(ctx: &RunContext<'_>, source: &SourceItem, state: &mut WorkflowState) -> DeckResult<Route> {
    let category = classify(source);
    let baseline = ctx.backend.render(&source.shapes)?;
    dump_artifact(ctx, &format!("orig_{}.png", state.index), &baseline)?;
    tracing::debug!(
        item = state.index,
        %category,
        digest = baseline.digest(),
        "analyzed"
    );
    state.category = Some(category);
    state.baseline = Some(baseline);
    Ok(Route::Next)
}

fn select(ctx: &RunContext<'_>, state: &mut WorkflowState) -> DeckResult<Route> {
    let category = state.category.ok_or_else(|| {
        DeckError::precondition(format!("item {}: selection before analysis", state.index))
    })?;
    let layout = select_layout(category, &mut state.tried_layouts, ctx.catalog.len());
    state.current_layout = Some(layout);
    Ok(Route::Category(category))
}

fn render(ctx: &RunContext<'_>, state: &mut WorkflowState) -> DeckResult<Route> {
    let placed = state.placed.as_ref().ok_or_else(|| {
        DeckError::precondition(format!("item {}: render before placement", state.index))
    })?;
    let candidate = ctx.backend.render(&placed.shapes)?;
    dump_artifact(ctx, &format!("new_{}.png", state.index), &candidate)?;
    state.candidate = Some(candidate);
    Ok(Route::Next)
}

fn compare(ctx: &RunContext<'_>, state: &mut WorkflowState) -> DeckResult<Route> {
    let (Some(baseline), Some(candidate)) = (&state.baseline, &state.candidate) else {
        return Err(DeckError::precondition(format!(
            "item {}: comparison requires baseline and candidate artifacts",
            state.index
        )));
    };

    let mut ok = pixels_match(baseline, candidate);
    if ok && let Some(placed) = &state.placed {
        ok = ctx.judge.judge(placed);
        if !ok {
            tracing::debug!(item = state.index, "judge rejected pixel-identical item");
        }
    } else if !ok {
        tracing::debug!(
            item = state.index,
            layout = ?state.current_layout,
            bounds = ?diff_bounds(baseline, candidate),
            "artifacts differ"
        );
    }
    state.quality_ok = ok;
    Ok(if ok { Route::Pass } else { Route::Fail })
}

fn dump_artifact(ctx: &RunContext<'_>, name: &str, artifact: &Artifact) -> DeckResult<()> {
    match ctx.artifact_dir {
        Some(dir) => artifact.save_png(&dir.join(name)),
        None => Ok(()),
    }
}

fn aborted_result(state: WorkflowState, err: DeckError) -> ItemResult {
    let failure = match &err {
        DeckError::Render(msg) => FailureReason::Render(msg.clone()),
        other => FailureReason::Fatal(other.to_string()),
    };
    ItemResult {
        index: state.index,
        success: false,
        feedback: Some(err.to_string()),
        attempts: state.attempts,
        layout: state.current_layout,
        failure: Some(failure),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/workflow/machine.rs"]
mod tests;
