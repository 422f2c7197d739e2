use super::*;
use crate::document::model::Shape;
use crate::foundation::core::Geometry;

fn text(t: &str) -> Shape {
    Shape::text_box(Geometry::new(0, 0, 100, 20), t)
}

fn picture() -> Shape {
    Shape::media(Geometry::new(0, 0, 100, 100))
}

#[test]
fn three_text_shapes_is_text() {
    let item = SourceItem::new(vec![text("a"), text("b"), text("c")]);
    let c = classify(&item);
    assert_eq!(c, ContentCategory::Text);
    assert_eq!(c.preferred_layout(), 0);
}

#[test]
fn media_with_text_is_image() {
    let item = SourceItem::new(vec![picture(), text("caption")]);
    let c = classify(&item);
    assert_eq!(c, ContentCategory::Image);
    assert_eq!(c.preferred_layout(), 1);
}

#[test]
fn media_wins_over_many_text_shapes() {
    let item = SourceItem::new(vec![text("a"), text("b"), text("c"), text("d"), picture()]);
    assert_eq!(classify(&item), ContentCategory::Image);
}

#[test]
fn up_to_two_text_shapes_is_complex() {
    assert_eq!(classify(&SourceItem::default()), ContentCategory::Complex);
    assert_eq!(
        classify(&SourceItem::new(vec![text("a")])),
        ContentCategory::Complex
    );
    assert_eq!(
        classify(&SourceItem::new(vec![text("a"), text("b")])),
        ContentCategory::Complex
    );
}

#[test]
fn empty_text_frames_still_count() {
    let item = SourceItem::new(vec![text(""), text(""), text("")]);
    assert_eq!(ShapeCensus::of(&item).text_shapes, 3);
    assert_eq!(classify(&item), ContentCategory::Text);
}

#[test]
fn plain_shapes_do_not_count() {
    let item = SourceItem::new(vec![
        text("a"),
        text("b"),
        Shape::plain(Geometry::new(0, 0, 5, 5)),
    ]);
    assert_eq!(
        ShapeCensus::of(&item),
        ShapeCensus {
            text_shapes: 2,
            has_media: false
        }
    );
    assert_eq!(classify(&item), ContentCategory::Complex);
}

#[test]
fn classification_is_deterministic() {
    let items = [
        SourceItem::new(vec![text("a"), text("b"), text("c")]),
        SourceItem::new(vec![picture()]),
        SourceItem::default(),
    ];
    for item in &items {
        let first = classify(item);
        for _ in 0..16 {
            assert_eq!(classify(item), first);
        }
    }
}
