use super::*;
use crate::document::model::Layout;
use crate::foundation::core::Geometry;

fn catalog() -> TemplateCatalog {
    TemplateCatalog::new(vec![
        Layout::blank("Blank"),
        Layout {
            name: "Title Only".to_string(),
            placeholders: vec![Shape::text_box(Geometry::new(0, 0, 1280, 80), "")],
        },
    ])
}

fn selected(index: usize, layout: usize) -> WorkflowState {
    let mut state = WorkflowState::new(index);
    state.current_layout = Some(layout);
    state
}

#[test]
fn copies_text_shapes_with_geometry() {
    let catalog = catalog();
    let document = SharedDocument::new();
    let source = SourceItem::new(vec![
        Shape::text_box(Geometry::new(10, 20, 300, 40), "Agenda"),
        Shape::media(Geometry::new(400, 100, 200, 200)),
        Shape::plain(Geometry::new(0, 0, 5, 5)),
        Shape::text_box(Geometry::new(10, 80, 300, 40), "Next steps"),
    ]);
    let input = PlacementInput {
        catalog: &catalog,
        document: &document,
        source: &source,
    };
    let mut state = selected(1, 1);
    apply_layout(&input, &mut state).unwrap();

    let placed = state.placed.clone().unwrap();
    assert_eq!(placed.layout, 1);
    assert_eq!(placed.layout_name, "Title Only");
    assert_eq!(placed.shapes.len(), 3);
    assert_eq!(placed.shapes[0].text, "");
    assert_eq!(
        placed.shapes[1],
        Shape::text_box(Geometry::new(10, 20, 300, 40), "Agenda")
    );
    assert_eq!(placed.shapes[2].text, "Next steps");
    assert!(placed.shapes.iter().all(|s| !s.is_media));
    assert!(state.new_item.is_some());
}

#[test]
fn item_without_text_yields_empty_item_on_blank_layout() {
    let catalog = catalog();
    let document = SharedDocument::new();
    let source = SourceItem::default();
    let input = PlacementInput {
        catalog: &catalog,
        document: &document,
        source: &source,
    };
    let mut state = selected(3, 0);
    HybridPlacement.place(&input, &mut state).unwrap();

    let doc = document.finalize();
    assert_eq!(doc.len(), 1);
    assert!(doc.items[0].shapes.is_empty());
}

#[test]
fn retries_replace_the_same_item() {
    let catalog = catalog();
    let document = SharedDocument::new();
    let source = SourceItem::new(vec![Shape::text_box(Geometry::new(0, 0, 10, 10), "x")]);
    let input = PlacementInput {
        catalog: &catalog,
        document: &document,
        source: &source,
    };
    let mut state = selected(2, 0);
    MechanicalRules.place(&input, &mut state).unwrap();
    let first = state.new_item;
    state.current_layout = Some(1);
    MechanicalRules.place(&input, &mut state).unwrap();
    assert_eq!(state.new_item, first);

    let doc = document.finalize();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.items[0].layout, 1);
}

#[test]
fn unknown_layout_is_a_precondition_violation() {
    let catalog = catalog();
    let document = SharedDocument::new();
    let source = SourceItem::default();
    let input = PlacementInput {
        catalog: &catalog,
        document: &document,
        source: &source,
    };
    let err = apply_layout(&input, &mut selected(1, 5)).unwrap_err();
    assert!(matches!(err, DeckError::Precondition(_)));
    let err = apply_layout(&input, &mut WorkflowState::new(1)).unwrap_err();
    assert!(matches!(err, DeckError::Precondition(_)));
}

#[test]
fn registry_dispatches_by_category() {
    let registry = PlacementRegistry::default();
    assert_eq!(registry.for_category(ContentCategory::Text).name(), "mechanical");
    assert_eq!(
        registry.for_category(ContentCategory::Image).name(),
        "model_assisted"
    );
    assert_eq!(registry.for_category(ContentCategory::Complex).name(), "hybrid");

    let mut registry = registry;
    registry.register(ContentCategory::Image, Box::new(HybridPlacement));
    assert_eq!(registry.for_category(ContentCategory::Image).name(), "hybrid");
}
