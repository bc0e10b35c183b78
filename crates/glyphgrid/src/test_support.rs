//! Test support utilities for glyphgrid.
//!
//! Small faces and palettes with predictable pixels, shared by the unit
//! tests, integration tests and benches. Not part of the rendering API.

use std::sync::Arc;

use crate::face::{GlyphBitmap, GlyphFace};
use crate::glyph::{Glyph, GlyphGrid};
use crate::palette::{Palette, Rgba8};

/// A face whose glyphs cover their whole cell, except `' '` which is empty.
///
/// Every non-space character rasterizes to a `width x height` block of full
/// coverage, so composited pixels are either pure foreground or pure
/// background.
#[derive(Copy, Clone, Debug)]
pub struct SolidFace {
    pub width: u32,
    pub height: u32,
}

impl SolidFace {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl GlyphFace for SolidFace {
    fn measure(&self, _ch: char) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn ascent(&self) -> f32 {
        self.height as f32
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        if ch == ' ' || !ch.is_ascii_graphic() {
            return GlyphBitmap::default();
        }
        let (width, height) = (self.width as usize, self.height as usize);
        GlyphBitmap {
            width,
            height,
            xmin: 0,
            ymin: 0,
            coverage: vec![0xFF; width * height],
        }
    }
}

/// `black` = 0, `white` = 1.
pub fn two_color_palette() -> Arc<Palette> {
    Arc::new(Palette::build([
        ("black", Rgba8::rgb(0, 0, 0)),
        ("white", Rgba8::rgb(255, 255, 255)),
    ]))
}

/// Grid of `cols x rows` with `text` written row-major from the origin,
/// foreground `fg` and background `bg`. Text beyond the grid is dropped.
pub fn grid_with_text(
    cols: u32,
    rows: u32,
    palette: Arc<Palette>,
    text: &str,
    fg: u8,
    bg: u8,
) -> GlyphGrid {
    let mut grid = GlyphGrid::new(cols, rows, palette);
    for (cell, ch) in grid.cells_mut().iter_mut().zip(text.chars()) {
        *cell = Glyph::new(ch, fg, bg);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_face_space_is_blank() {
        let face = SolidFace::new(4, 6);
        assert!(face.rasterize(' ').coverage.is_empty());
        assert_eq!(face.rasterize('#').coverage.len(), 24);
    }
}
