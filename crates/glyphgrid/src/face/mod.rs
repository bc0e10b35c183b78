//! Font faces the glyph atlas rasterizes from.
mod bitmap;
#[cfg(feature = "fonts")]
mod truetype;

pub use bitmap::BitmapFace;
#[cfg(feature = "fonts")]
pub use truetype::FontFace;

/// Coverage bitmap of a single rasterized character.
///
/// Placement follows the fontdue convention: `xmin` is the offset from the
/// pen position, `ymin` the offset of the bitmap's bottom edge from the
/// baseline (negative for descenders).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
}

impl GlyphBitmap {
    pub fn coverage_at(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.coverage[y * self.width + x]
        } else {
            0
        }
    }
}

/// A font at a fixed pixel size.
pub trait GlyphFace {
    /// Advance width and line height of `ch`.
    fn measure(&self, ch: char) -> (f32, f32);

    /// Distance from the top of a cell to the baseline.
    fn ascent(&self) -> f32;

    fn rasterize(&self, ch: char) -> GlyphBitmap;
}

impl<F: GlyphFace + ?Sized> GlyphFace for &F {
    fn measure(&self, ch: char) -> (f32, f32) {
        (**self).measure(ch)
    }

    fn ascent(&self) -> f32 {
        (**self).ascent()
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        (**self).rasterize(ch)
    }
}
