use super::*;
use crate::foundation::core::Geometry;

fn item(source_index: usize, text: &str) -> OutputItem {
    OutputItem {
        source_index,
        layout: 0,
        layout_name: "Blank".to_string(),
        shapes: vec![Shape::text_box(Geometry::new(0, 0, 10, 10), text)],
    }
}

#[test]
fn from_layout_starts_with_placeholders() {
    let layout = Layout {
        name: "Title Only".to_string(),
        placeholders: vec![Shape::text_box(Geometry::new(0, 0, 100, 20), "")],
    };
    let out = OutputItem::from_layout(4, 2, &layout);
    assert_eq!(out.source_index, 4);
    assert_eq!(out.layout, 2);
    assert_eq!(out.layout_name, "Title Only");
    assert_eq!(out.shapes, layout.placeholders);
}

#[test]
fn replace_overwrites_in_place() {
    let shared = SharedDocument::new();
    let h = shared.append(item(1, "first"));
    shared.append(item(2, "other"));
    shared.replace(h, item(1, "second")).unwrap();

    let doc = shared.finalize();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.items[0].shapes[0].text, "second");
}

#[test]
fn replace_rejects_foreign_and_unknown_handles() {
    let mut doc = OutputDocument::new();
    let h = doc.append(item(1, "a"));
    assert!(doc.replace(h, item(2, "b")).is_err());
    assert!(doc.replace(ItemHandle(9), item(1, "b")).is_err());
    assert_eq!(doc.items[0].shapes[0].text, "a");
}

#[test]
fn finalize_restores_source_order() {
    let shared = SharedDocument::new();
    for idx in [3, 1, 2] {
        shared.append(item(idx, "x"));
    }
    let doc = shared.finalize();
    let order: Vec<_> = doc.items.iter().map(|i| i.source_index).collect();
    assert_eq!(order, vec![1, 2, 3]);
}
