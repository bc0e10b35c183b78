use std::sync::Arc;

use crate::palette::Palette;

/// One grid cell: a character plus foreground and background palette indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    pub ch: char,
    pub fg: u8,
    pub bg: u8,
}

impl Glyph {
    pub const fn new(ch: char, fg: u8, bg: u8) -> Self {
        Self { ch, fg, bg }
    }
}

impl Default for Glyph {
    fn default() -> Self {
        Self::new('\0', 0, 0)
    }
}

/// Logical state of a fixed-size glyph display.
///
/// Cells are stored row-major; `cells().len()` is always `cols * rows`.
/// Resizing means building a new grid.
#[derive(Clone, Debug)]
pub struct GlyphGrid {
    cols: u32,
    rows: u32,
    glyphs: Vec<Glyph>,
    palette: Arc<Palette>,
}

impl GlyphGrid {
    pub fn new(cols: u32, rows: u32, palette: Arc<Palette>) -> Self {
        Self {
            cols,
            rows,
            glyphs: vec![Glyph::default(); cols as usize * rows as usize],
            palette,
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// # Panics
    /// Panics if `(col, row)` lies outside the grid.
    pub fn set(&mut self, col: u32, row: u32, glyph: Glyph) {
        let idx = self.index(col, row);
        self.glyphs[idx] = glyph;
    }

    /// # Panics
    /// Panics if `(col, row)` lies outside the grid.
    pub fn get(&self, col: u32, row: u32) -> Glyph {
        self.glyphs[self.index(col, row)]
    }

    pub fn checked_get(&self, col: u32, row: u32) -> Option<Glyph> {
        (col < self.cols && row < self.rows)
            .then(|| self.glyphs[row as usize * self.cols as usize + col as usize])
    }

    pub fn fill(&mut self, glyph: Glyph) {
        self.glyphs.fill(glyph);
    }

    pub fn cells(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Mutable row-major access for bulk fill routines.
    pub fn cells_mut(&mut self) -> &mut [Glyph] {
        &mut self.glyphs
    }

    fn index(&self, col: u32, row: u32) -> usize {
        assert!(
            col < self.cols && row < self.rows,
            "cell ({col}, {row}) outside {}x{} grid",
            self.cols,
            self.rows
        );
        row as usize * self.cols as usize + col as usize
    }
}
