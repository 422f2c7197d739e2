use crate::foundation::{
    core::Geometry,
    error::{DeckError, DeckResult},
};

/// A positioned sub-element of an item carrying text and/or media.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    /// Whether the shape owns a text frame (possibly empty).
    #[serde(default)]
    pub has_text: bool,
    /// Text content; ignored when `has_text` is false.
    #[serde(default)]
    pub text: String,
    /// Placement on the item.
    pub geometry: Geometry,
    /// Whether the shape is a picture or other media object.
    #[serde(default)]
    pub is_media: bool,
}

impl Shape {
    /// Text box at `geometry` holding `text`.
    pub fn text_box(geometry: Geometry, text: impl Into<String>) -> Self {
        Self {
            has_text: true,
            text: text.into(),
            geometry,
            is_media: false,
        }
    }

    /// Media shape (picture) at `geometry`.
    pub fn media(geometry: Geometry) -> Self {
        Self {
            has_text: false,
            text: String::new(),
            geometry,
            is_media: true,
        }
    }

    /// Shape without text or media (connector, decoration).
    pub fn plain(geometry: Geometry) -> Self {
        Self {
            geometry,
            ..Self::default()
        }
    }

    fn validate(&self) -> DeckResult<()> {
        if !self.geometry.is_well_formed() {
            return Err(DeckError::validation(format!(
                "shape geometry must have non-negative width/height within range, got {}x{} at ({}, {})",
                self.geometry.width, self.geometry.height, self.geometry.left, self.geometry.top
            )));
        }
        Ok(())
    }
}

/// One source item (slide). Immutable once loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceItem {
    /// Shapes in z-order.
    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl SourceItem {
    /// Build an item from its shapes.
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Shapes that carry a text frame.
    pub fn text_shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.has_text)
    }
}

/// A loaded source document.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SourceDeck {
    /// Items in document order.
    pub items: Vec<SourceItem>,
}

impl SourceDeck {
    /// Check every shape of every item.
    pub fn validate(&self) -> DeckResult<()> {
        for (pos, item) in self.items.iter().enumerate() {
            for shape in &item.shapes {
                shape
                    .validate()
                    .map_err(|e| DeckError::validation(format!("item {}: {e}", pos + 1)))?;
            }
        }
        Ok(())
    }
}

/// A template-defined placement scheme an output item is instantiated from.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Layout {
    /// Human-readable layout name ("Title Slide", "Blank", ...).
    #[serde(default)]
    pub name: String,
    /// Shapes every item created from this layout starts with.
    #[serde(default)]
    pub placeholders: Vec<Shape>,
}

impl Layout {
    /// Layout named `name` with no placeholders.
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            placeholders: Vec::new(),
        }
    }
}

/// Ordered, immutable set of layouts addressed by index `0..N`.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateCatalog {
    /// Layouts in template order.
    pub layouts: Vec<Layout>,
}

impl TemplateCatalog {
    /// Build a catalog from its layouts.
    pub fn new(layouts: Vec<Layout>) -> Self {
        Self { layouts }
    }

    /// Number of layouts.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    /// Return `true` when the catalog has no layouts.
    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Layout at `idx`, if any.
    pub fn layout(&self, idx: usize) -> Option<&Layout> {
        self.layouts.get(idx)
    }

    /// A usable catalog has at least one layout and well-formed placeholders.
    pub fn validate(&self) -> DeckResult<()> {
        if self.layouts.is_empty() {
            return Err(DeckError::validation(
                "template catalog must contain at least one layout",
            ));
        }
        for (idx, layout) in self.layouts.iter().enumerate() {
            for shape in &layout.placeholders {
                shape
                    .validate()
                    .map_err(|e| DeckError::validation(format!("layout {idx}: {e}")))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/model.rs"]
mod tests;
