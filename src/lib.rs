//! deckform converts every item (slide) of a source deck into an item of a new output document,
//! reshaped onto layouts drawn from a template catalog.
//!
//! # Pipeline overview
//!
//! Each source item runs through a small, bounded state machine:
//!
//! 1. **Analyze**: classify the item ([`ContentCategory`]) and render its baseline [`Artifact`]
//! 2. **Select**: pick the next untried layout, starting at the category's preferred index
//! 3. **Place**: dispatch to the [`PlacementStrategy`] registered for the category
//! 4. **Render**: rasterize the produced [`OutputItem`]
//! 5. **Compare**: exact pixel equality between baseline and candidate
//! 6. **Feedback**: on failure record a diagnostic and retry, up to `max_attempts` times
//!
//! [`ConvertSession`] runs one such machine per item on a rayon pool. All runs write into a
//! single [`SharedDocument`] whose structural mutations are serialized behind one lock; each
//! run only holds the [`ItemHandle`] of its own item.
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: classification, selection and CPU rendering are pure functions of
//!   their inputs.
//! - **Failures stay per item**: quality rejections, render errors and panics are captured in
//!   that item's [`ItemResult`]; sibling runs always complete.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod analyze;
mod document;
mod foundation;
mod place;
mod render;
mod session;
mod verify;
mod workflow;

pub use analyze::classify::{ShapeCensus, classify};
pub use analyze::select::select_layout;
pub use document::model::{Layout, Shape, SourceDeck, SourceItem, TemplateCatalog};
pub use document::output::{DocumentWriter, ItemHandle, OutputDocument, OutputItem, SharedDocument};
pub use document::store::{load_deck, load_template, save_output, write_json};
pub use foundation::core::{ContentCategory, Geometry, MAX_ATTEMPTS, Rect};
pub use foundation::error::{DeckError, DeckResult};
pub use place::strategy::{
    HybridPlacement, MechanicalRules, ModelAssisted, PlacementInput, PlacementRegistry,
    PlacementStrategy, apply_layout,
};
pub use render::backend::{Artifact, BackendKind, RenderBackend, RenderSettings, create_backend};
pub use render::cpu::CpuBackend;
pub use session::convert::{ConversionReport, ConvertOpts, ConvertSession};
pub use verify::feedback::record_failure;
pub use verify::gate::{DiffBounds, diff_bounds, pixels_match};
pub use verify::judge::{AcceptAll, Judge};
pub use workflow::machine::{
    Route, RunContext, RunLimits, STEPS_PER_ATTEMPT, Step, drive, run_item, transition,
};
pub use workflow::state::{FailureReason, ItemResult, WorkflowState};
