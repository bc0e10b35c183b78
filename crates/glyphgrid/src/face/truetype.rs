use std::sync::Arc;

use fontdue::{Font, FontSettings};

use super::{GlyphBitmap, GlyphFace};
use crate::error::{RenderError, Result};

/// A fontdue font at a fixed pixel size.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<Font>,
    px: f32,
}

impl FontFace {
    pub fn new(font: Arc<Font>, px: f32) -> Self {
        Self { font, px }
    }

    pub fn from_bytes(bytes: &[u8], px: f32) -> Result<Self> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self::new(Arc::new(font), px))
    }

    pub fn size(&self) -> f32 {
        self.px
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.font.name())
            .field("px", &self.px)
            .finish()
    }
}

impl GlyphFace for FontFace {
    fn measure(&self, ch: char) -> (f32, f32) {
        let metrics = self.font.metrics(ch, self.px);
        let line_height = self
            .font
            .horizontal_line_metrics(self.px)
            .map(|m| m.new_line_size)
            .unwrap_or(self.px);
        (metrics.advance_width, line_height)
    }

    fn ascent(&self) -> f32 {
        self.font
            .horizontal_line_metrics(self.px)
            .map(|m| m.ascent)
            .unwrap_or(self.px)
    }

    fn rasterize(&self, ch: char) -> GlyphBitmap {
        let (metrics, coverage) = self.font.rasterize(ch, self.px);
        GlyphBitmap {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_font_error() {
        let err = FontFace::from_bytes(b"not a font", 8.0).unwrap_err();
        assert!(matches!(err, RenderError::Font(_)));
    }
}
