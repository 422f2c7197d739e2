use crate::{document::model::SourceItem, foundation::core::ContentCategory};

/// Shape composition counters gathered in one pass over an item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShapeCensus {
    /// Shapes carrying a text frame.
    pub text_shapes: usize,
    /// Whether any shape is media.
    pub has_media: bool,
}

impl ShapeCensus {
    /// Scan `item` once.
    pub fn of(item: &SourceItem) -> Self {
        item.shapes.iter().fold(Self::default(), |mut acc, shape| {
            if shape.has_text {
                acc.text_shapes += 1;
            }
            acc.has_media |= shape.is_media;
            acc
        })
    }

    /// Category implied by these counts.
    pub fn category(self) -> ContentCategory {
        if self.has_media {
            ContentCategory::Image
        } else if self.text_shapes > 2 {
            ContentCategory::Text
        } else {
            ContentCategory::Complex
        }
    }
}

/// Derive the content category of `item`.
///
/// Media wins over any amount of text; more than two text shapes make a text item.
pub fn classify(item: &SourceItem) -> ContentCategory {
    ShapeCensus::of(item).category()
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/classify.rs"]
mod tests;
