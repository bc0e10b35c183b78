//! Single-row glyph atlas for the printable ASCII range.
//!
//! Every character from `' '` to `'~'` is rasterized once into one RGBA
//! canvas (white, alpha = coverage), left to right, each in a cell of the
//! same size. The canvas is always `RUNE_COUNT * cell_width` wide and
//! `cell_height` tall; it never depends on the output surface.

use tracing::debug;

use crate::error::{RenderError, Result};
use crate::face::GlyphFace;
use crate::{FIRST_PRINTABLE, LAST_PRINTABLE, RUNE_COUNT};

/// Character measured to derive the uniform cell size.
pub const REFERENCE_GLYPH: char = 'M';

/// Pixel rectangle `[x0, y0, x1, y1)` inside the atlas canvas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AtlasRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl AtlasRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn overlaps(&self, other: &AtlasRect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

pub struct GlyphAtlas {
    pixels: Vec<u8>,
    rects: Vec<AtlasRect>,
    cell_width: u32,
    cell_height: u32,
}

impl GlyphAtlas {
    pub fn build<F: GlyphFace + ?Sized>(face: &F) -> Result<Self> {
        let (w, h) = face.measure(REFERENCE_GLYPH);
        let cell_width = w as u32;
        let cell_height = h as u32;
        if cell_width == 0 || cell_height == 0 {
            return Err(RenderError::Font(format!(
                "reference glyph {REFERENCE_GLYPH:?} measures {w}x{h}"
            )));
        }

        let width = RUNE_COUNT * cell_width;
        let mut pixels = vec![0u8; width as usize * cell_height as usize * 4];
        let mut rects = Vec::with_capacity(RUNE_COUNT as usize);
        let baseline = face.ascent().round() as i32;

        for code in FIRST_PRINTABLE..=LAST_PRINTABLE {
            let slot = code - FIRST_PRINTABLE;
            let rect = AtlasRect {
                x0: slot * cell_width,
                y0: 0,
                x1: (slot + 1) * cell_width,
                y1: cell_height,
            };
            let ch = char::from_u32(code).unwrap_or(' ');
            let bitmap = face.rasterize(ch);
            let top = baseline - (bitmap.ymin + bitmap.height as i32);

            for by in 0..bitmap.height {
                let y = top + by as i32;
                if y < 0 || y >= cell_height as i32 {
                    continue;
                }
                for bx in 0..bitmap.width {
                    let x = bitmap.xmin + bx as i32;
                    if x < 0 || x >= cell_width as i32 {
                        continue;
                    }
                    let coverage = bitmap.coverage_at(bx, by);
                    let offset = (y as usize * width as usize + rect.x0 as usize + x as usize) * 4;
                    pixels[offset..offset + 4].copy_from_slice(&[0xFF, 0xFF, 0xFF, coverage]);
                }
            }
            rects.push(rect);
        }

        debug!(cell_width, cell_height, width, "built glyph atlas");
        Ok(Self {
            pixels,
            rects,
            cell_width,
            cell_height,
        })
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    pub fn width(&self) -> u32 {
        RUNE_COUNT * self.cell_width
    }

    pub fn height(&self) -> u32 {
        self.cell_height
    }

    /// RGBA canvas, `width() * height() * 4` bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Rectangles of all printable characters in code order.
    pub fn rects(&self) -> &[AtlasRect] {
        &self.rects
    }

    pub fn slot(&self, ch: char) -> Option<u8> {
        let code = u32::from(ch);
        (FIRST_PRINTABLE..=LAST_PRINTABLE)
            .contains(&code)
            .then(|| (code - FIRST_PRINTABLE) as u8)
    }

    pub fn rect(&self, ch: char) -> Option<AtlasRect> {
        self.slot(ch).map(|slot| self.rects[slot as usize])
    }

    pub fn view(&self, ch: char) -> Option<GlyphView<'_>> {
        self.rect(ch).map(|rect| GlyphView { atlas: self, rect })
    }

    /// Coverage at canvas position `(x, y)`; 0 outside the canvas.
    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        self.pixels[(y as usize * self.width() as usize + x as usize) * 4 + 3]
    }

    /// Export the canvas as an image, e.g. for inspection.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width(), self.height(), self.pixels.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width(), self.height()))
    }
}

impl std::fmt::Debug for GlyphAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("cell_width", &self.cell_width)
            .field("cell_height", &self.cell_height)
            .field("glyphs", &self.rects.len())
            .finish()
    }
}

/// Borrowed view of one glyph inside the atlas. Owns no pixels.
#[derive(Copy, Clone, Debug)]
pub struct GlyphView<'a> {
    atlas: &'a GlyphAtlas,
    rect: AtlasRect,
}

impl<'a> GlyphView<'a> {
    pub fn rect(&self) -> AtlasRect {
        self.rect
    }

    pub fn atlas(&self) -> &'a GlyphAtlas {
        self.atlas
    }

    /// Coverage at cell-local `(x, y)`; 0 outside the glyph's rectangle.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.rect.width() || y >= self.rect.height() {
            return 0;
        }
        self.atlas.coverage_at(self.rect.x0 + x, self.rect.y0 + y)
    }
}
