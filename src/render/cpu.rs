use image::{Rgba, RgbaImage};

use crate::{
    document::model::Shape,
    foundation::core::Rect,
    foundation::error::{DeckError, DeckResult},
    render::backend::{Artifact, RenderBackend, RenderSettings},
};

const GLYPH_COLS: u32 = 5;
const GLYPH_ROWS: u32 = 7;
const GLYPH_SCALE: u32 = 2;
const GLYPH_ADVANCE: u32 = (GLYPH_COLS + 1) * GLYPH_SCALE;

/// Deterministic CPU rasterizer.
///
/// Only text frames are rasterized. They are laid out as a flow of lines starting at the
/// margin, one line per shape (plus one per embedded newline), in shape order, regardless of
/// geometry. An empty text frame still consumes its line. Media and plain shapes leave no ink,
/// so an item compares equal to a copy that kept only its text.
#[derive(Clone, Debug)]
pub struct CpuBackend {
    settings: RenderSettings,
}

impl CpuBackend {
    /// Create a backend; the canvas must be non-empty.
    pub fn new(settings: RenderSettings) -> DeckResult<Self> {
        if settings.width == 0 || settings.height == 0 {
            return Err(DeckError::render("canvas width/height must be > 0"));
        }
        if settings.line_height == 0 {
            return Err(DeckError::render("line_height must be > 0"));
        }
        Ok(Self { settings })
    }

    /// Settings this backend renders with.
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn canvas_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.settings.width as f64,
            self.settings.height as f64,
        )
    }
}

impl RenderBackend for CpuBackend {
    fn render(&self, shapes: &[Shape]) -> DeckResult<Artifact> {
        let s = &self.settings;
        let mut img = RgbaImage::from_pixel(s.width, s.height, Rgba(s.clear_rgba));
        let canvas = self.canvas_rect();
        let mut y = i64::from(s.margin);

        for shape in shapes {
            if !shape.geometry.is_well_formed() {
                return Err(DeckError::render(format!(
                    "shape geometry out of range: {}x{} at ({}, {})",
                    shape.geometry.width,
                    shape.geometry.height,
                    shape.geometry.left,
                    shape.geometry.top
                )));
            }
            if !shape.has_text {
                continue;
            }
            for (i, line) in shape.text.split('\n').enumerate() {
                if i > 0 {
                    y += i64::from(s.line_height);
                }
                let x = i64::from(s.margin);
                if line_box(x, y, line).intersect(canvas).area() > 0.0 {
                    draw_line(&mut img, x, y, line, s.ink_rgba);
                }
            }
            y += i64::from(s.line_height);
        }

        let (width, height) = img.dimensions();
        Ok(Artifact {
            width,
            height,
            data: img.into_raw(),
        })
    }
}

// Pixel box a line of `text` would cover at `(x, y)`.
fn line_box(x: i64, y: i64, text: &str) -> Rect {
    let chars = text.chars().count() as f64;
    Rect::new(
        x as f64,
        y as f64,
        x as f64 + chars * f64::from(GLYPH_ADVANCE),
        y as f64 + f64::from(GLYPH_ROWS * GLYPH_SCALE),
    )
}

fn draw_line(img: &mut RgbaImage, x: i64, y: i64, text: &str, rgba: [u8; 4]) {
    let mut pen_x = x;
    for ch in text.chars() {
        if !ch.is_whitespace() {
            draw_glyph(img, pen_x, y, glyph_bits(ch), rgba);
        }
        pen_x += i64::from(GLYPH_ADVANCE);
        if pen_x >= i64::from(img.width()) {
            break;
        }
    }
}

fn draw_glyph(img: &mut RgbaImage, x: i64, y: i64, bits: u64, rgba: [u8; 4]) {
    let (w, h) = (i64::from(img.width()), i64::from(img.height()));
    for row in 0..GLYPH_ROWS {
        for col in 0..GLYPH_COLS {
            if bits >> (row * GLYPH_COLS + col) & 1 == 0 {
                continue;
            }
            for dy in 0..GLYPH_SCALE {
                for dx in 0..GLYPH_SCALE {
                    let px = x + i64::from(col * GLYPH_SCALE + dx);
                    let py = y + i64::from(row * GLYPH_SCALE + dy);
                    if (0..w).contains(&px) && (0..h).contains(&py) {
                        img.put_pixel(px as u32, py as u32, Rgba(rgba));
                    }
                }
            }
        }
    }
}

// 35-bit cell pattern; never blank so every visible character leaves ink.
fn glyph_bits(ch: char) -> u64 {
    let mut buf = [0u8; 4];
    let bits = xxhash_rust::xxh3::xxh3_64(ch.encode_utf8(&mut buf).as_bytes())
        & ((1 << (GLYPH_COLS * GLYPH_ROWS)) - 1);
    bits | 1
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
