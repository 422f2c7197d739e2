pub use kurbo::Rect;

/// Default upper bound on failed quality checks per item.
pub const MAX_ATTEMPTS: u32 = 3;

/// Axis-aligned placement of a shape on its item, in render pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    /// Distance from the left edge.
    pub left: i64,
    /// Distance from the top edge.
    pub top: i64,
    /// Horizontal extent, must be >= 0.
    pub width: i64,
    /// Vertical extent, must be >= 0.
    pub height: i64,
}

impl Geometry {
    /// Construct a geometry from its four components.
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Return `true` when neither extent is negative and both far edges fit in `i64`.
    pub fn is_well_formed(self) -> bool {
        self.width >= 0
            && self.height >= 0
            && self.left.checked_add(self.width).is_some()
            && self.top.checked_add(self.height).is_some()
    }

    /// Bounds as a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        let (left, top) = (self.left as f64, self.top as f64);
        Rect::new(
            left,
            top,
            left + self.width as f64,
            top + self.height as f64,
        )
    }
}

/// Dominant content type of an item.
///
/// Drives both layout preference and placement strategy selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    /// More than two text-bearing shapes and no media.
    Text,
    /// At least one media shape.
    Image,
    /// Anything else: up to two text shapes and no media.
    Complex,
}

impl ContentCategory {
    /// All categories, in preference order.
    pub const ALL: [ContentCategory; 3] = [Self::Text, Self::Image, Self::Complex];

    /// Layout index the selector starts scanning from.
    pub fn preferred_layout(self) -> usize {
        match self {
            Self::Text => 0,
            Self::Image => 1,
            Self::Complex => 2,
        }
    }

    /// Stable lowercase name used in logs and reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Complex => "complex",
        }
    }
}

impl std::fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
