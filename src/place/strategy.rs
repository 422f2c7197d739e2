use crate::{
    document::model::{Shape, SourceItem, TemplateCatalog},
    document::output::{OutputItem, SharedDocument},
    foundation::core::ContentCategory,
    foundation::error::{DeckError, DeckResult},
    workflow::state::WorkflowState,
};

/// Read-only inputs a placement step works from.
#[derive(Clone, Copy, Debug)]
pub struct PlacementInput<'a> {
    /// Template layouts.
    pub catalog: &'a TemplateCatalog,
    /// Shared output document.
    pub document: &'a SharedDocument,
    /// Item being converted.
    pub source: &'a SourceItem,
}

/// Copies or repositions a source item's content into its output item.
pub trait PlacementStrategy: Send + Sync {
    /// Stable strategy name for logs.
    fn name(&self) -> &'static str;

    /// Write the output item for `state.current_layout` and record it in `state`.
    fn place(&self, input: &PlacementInput<'_>, state: &mut WorkflowState) -> DeckResult<()>;
}

/// Rule-based placement for text-heavy items.
#[derive(Clone, Copy, Debug, Default)]
pub struct MechanicalRules;

/// Placement for media items; the slot a model-backed placer plugs into.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelAssisted;

/// Placement for sparse or mixed items.
#[derive(Clone, Copy, Debug, Default)]
pub struct HybridPlacement;

impl PlacementStrategy for MechanicalRules {
    fn name(&self) -> &'static str {
        "mechanical"
    }

    fn place(&self, input: &PlacementInput<'_>, state: &mut WorkflowState) -> DeckResult<()> {
        apply_layout(input, state)
    }
}

impl PlacementStrategy for ModelAssisted {
    fn name(&self) -> &'static str {
        "model_assisted"
    }

    fn place(&self, input: &PlacementInput<'_>, state: &mut WorkflowState) -> DeckResult<()> {
        apply_layout(input, state)
    }
}

impl PlacementStrategy for HybridPlacement {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn place(&self, input: &PlacementInput<'_>, state: &mut WorkflowState) -> DeckResult<()> {
        apply_layout(input, state)
    }
}

/// Instantiate the selected layout and copy every text-bearing source shape into it.
///
/// Text boxes keep the source geometry and text verbatim. Media and plain shapes are not
/// copied. The first call appends the item to the shared document; later calls for the same
/// run replace it, so one item survives per source item.
pub fn apply_layout(input: &PlacementInput<'_>, state: &mut WorkflowState) -> DeckResult<()> {
    let layout_idx = state.current_layout.ok_or_else(|| {
        DeckError::precondition(format!("item {}: placement before layout selection", state.index))
    })?;
    let layout = input.catalog.layout(layout_idx).ok_or_else(|| {
        DeckError::precondition(format!(
            "item {}: layout {layout_idx} not in catalog of {}",
            state.index,
            input.catalog.len()
        ))
    })?;

    let mut item = OutputItem::from_layout(state.index, layout_idx, layout);
    item.shapes.extend(
        input
            .source
            .text_shapes()
            .map(|s| Shape::text_box(s.geometry, s.text.clone())),
    );

    match state.new_item {
        Some(handle) => input.document.replace(handle, item.clone())?,
        None => state.new_item = Some(input.document.append(item.clone())),
    }
    state.placed = Some(item);
    Ok(())
}

/// One placement strategy per content category.
pub struct PlacementRegistry {
    text: Box<dyn PlacementStrategy>,
    image: Box<dyn PlacementStrategy>,
    complex: Box<dyn PlacementStrategy>,
}

impl PlacementRegistry {
    /// Swap the strategy used for `category`.
    pub fn register(&mut self, category: ContentCategory, strategy: Box<dyn PlacementStrategy>) {
        match category {
            ContentCategory::Text => self.text = strategy,
            ContentCategory::Image => self.image = strategy,
            ContentCategory::Complex => self.complex = strategy,
        }
    }

    /// Strategy registered for `category`.
    pub fn for_category(&self, category: ContentCategory) -> &dyn PlacementStrategy {
        match category {
            ContentCategory::Text => self.text.as_ref(),
            ContentCategory::Image => self.image.as_ref(),
            ContentCategory::Complex => self.complex.as_ref(),
        }
    }
}

impl Default for PlacementRegistry {
    fn default() -> Self {
        Self {
            text: Box::new(MechanicalRules),
            image: Box::new(ModelAssisted),
            complex: Box::new(HybridPlacement),
        }
    }
}

impl std::fmt::Debug for PlacementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementRegistry")
            .field("text", &self.text.name())
            .field("image", &self.image.name())
            .field("complex", &self.complex.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/place/strategy.rs"]
mod tests;
