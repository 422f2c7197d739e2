use std::path::Path;

use crate::{
    document::model::Shape,
    foundation::error::{DeckError, DeckResult},
};

/// A rendered item as straight-alpha RGBA8 pixels.
///
/// Artifacts are only ever compared for equality; two renders of the same shapes with the same
/// settings are byte-identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Artifact {
    /// 64-bit content digest, used to correlate artifacts in logs.
    pub fn digest(&self) -> u64 {
        let mut h = xxhash_rust::xxh3::Xxh3::new();
        h.update(&self.width.to_le_bytes());
        h.update(&self.height.to_le_bytes());
        h.update(&self.data);
        h.digest()
    }

    /// Write the artifact as a PNG file.
    pub fn save_png(&self, path: &Path) -> DeckResult<()> {
        crate::document::store::ensure_parent_dir(path)?;
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| DeckError::io(path, std::io::Error::other(e)))
    }
}

/// Rasterizes an item's shapes into a comparable [`Artifact`].
///
/// Backends are shared by every worker of a conversion job, so rendering takes `&self`.
pub trait RenderBackend: Send + Sync {
    /// Render `shapes` (source item or produced item) into an artifact.
    fn render(&self, shapes: &[Shape]) -> DeckResult<Artifact>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    /// Built-in CPU rasterizer.
    Cpu,
}

/// Backend-agnostic settings.
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Background color.
    pub clear_rgba: [u8; 4],
    /// Glyph color.
    pub ink_rgba: [u8; 4],
    /// Left/top offset of the first text line.
    pub margin: u32,
    /// Vertical advance per text line.
    pub line_height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            clear_rgba: [255, 255, 255, 255],
            ink_rgba: [0, 0, 0, 255],
            margin: 10,
            line_height: 20,
        }
    }
}

/// Create a rendering backend implementation.
pub fn create_backend(
    kind: BackendKind,
    settings: &RenderSettings,
) -> DeckResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new(
            settings.clone(),
        )?)),
    }
}
