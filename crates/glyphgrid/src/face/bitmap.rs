use super::{GlyphBitmap, GlyphFace};
use crate::{FIRST_PRINTABLE, LAST_PRINTABLE};

// 8x16 VGA font for ASCII 32-126, one byte per row, MSB = leftmost pixel.
const VGA_8X16: &[u8; 1520] = include_bytes!("vga8x16.bin");

/// Built-in 1-bit bitmap face.
///
/// Every glyph fills its whole cell, so bitmaps sit at the cell origin and
/// the baseline is the bottom edge. Characters outside the printable range
/// rasterize as blanks.
#[derive(Clone, Debug)]
pub struct BitmapFace {
    width: usize,
    height: usize,
    data: &'static [u8],
}

impl BitmapFace {
    /// The 8x16 VGA BIOS font.
    pub fn vga() -> Self {
        Self {
            width: 8,
            height: 16,
            data: VGA_8X16,
        }
    }

    fn rows_of(&self, ch: char) -> Option<&[u8]> {
        let code = u32::from(ch);
        if !(FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) {
            return None;
        }
        let start = (code - FIRST_PRINTABLE) as usize * self.height;
        self.data.get(start..start + self.height)
    }
}

impl Default for BitmapFace {
    fn default() -> Self {
        Self::vga()
    }
}

impl GlyphFace for BitmapFace {
    fn measure(&self, _ch: char) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn ascent(&self) -> f32 {
        self.height as f32
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let mut coverage = vec![0u8; self.width * self.height];
        if let Some(rows) = self.rows_of(ch) {
            for (y, bits) in rows.iter().enumerate() {
                for x in 0..self.width {
                    if (bits >> (7 - x)) & 1 != 0 {
                        coverage[y * self.width + x] = 0xFF;
                    }
                }
            }
        }
        GlyphBitmap {
            width: self.width,
            height: self.height,
            xmin: 0,
            ymin: 0,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_is_blank() {
        let bmp = BitmapFace::vga().rasterize(' ');
        assert!(bmp.coverage.iter().all(|&c| c == 0));
    }

    #[test]
    fn letter_a_has_apex_pixel() {
        // Row 2 of 'A' is 0x10: a single pixel in column 3.
        let bmp = BitmapFace::vga().rasterize('A');
        assert_eq!(bmp.coverage_at(3, 2), 0xFF);
        assert_eq!(bmp.coverage_at(2, 2), 0);
        assert_eq!(bmp.coverage_at(4, 2), 0);
    }

    #[test]
    fn non_printable_is_blank() {
        let bmp = BitmapFace::vga().rasterize('\u{7f}');
        assert!(bmp.coverage.iter().all(|&c| c == 0));
    }
}
