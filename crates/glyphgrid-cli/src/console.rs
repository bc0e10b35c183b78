use std::fmt::Write;

use glyphgrid::{GlyphGrid, Result, Rgba8};

/// Render the grid as 24-bit ANSI: one escape pair per cell, a reset at the
/// end of every row. Characters the atlas cannot show print as spaces.
pub fn grid_to_ansi(grid: &GlyphGrid) -> Result<String> {
    let palette = grid.palette();
    let mut out = String::with_capacity(grid.len() * 40);
    for row in 0..grid.rows() {
        if row > 0 {
            out.push('\n');
        }
        for col in 0..grid.cols() {
            let glyph = grid.get(col, row);
            let fg = palette.color_at(usize::from(glyph.fg))?;
            let bg = palette.color_at(usize::from(glyph.bg))?;
            let ch = if glyph.ch.is_ascii_graphic() { glyph.ch } else { ' ' };
            push_color(&mut out, 38, fg);
            push_color(&mut out, 48, bg);
            out.push(ch);
        }
        out.push_str("\x1B[0m");
    }
    Ok(out)
}

fn push_color(out: &mut String, layer: u8, c: Rgba8) {
    let _ = write!(out, "\x1B[{layer};2;{};{};{}m", c.r, c.g, c.b);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgrid::test_support::{grid_with_text, two_color_palette};

    #[test]
    fn cells_carry_fg_and_bg_escapes() {
        let grid = grid_with_text(2, 1, two_color_palette(), "A\0", 1, 0);
        let ansi = grid_to_ansi(&grid).unwrap();
        assert_eq!(
            ansi,
            "\x1B[38;2;255;255;255m\x1B[48;2;0;0;0mA\
             \x1B[38;2;255;255;255m\x1B[48;2;0;0;0m \x1B[0m"
        );
    }

    #[test]
    fn rows_are_newline_separated() {
        let grid = grid_with_text(1, 3, two_color_palette(), "abc", 0, 1);
        let ansi = grid_to_ansi(&grid).unwrap();
        assert_eq!(ansi.matches('\n').count(), 2);
        assert_eq!(ansi.matches("\x1B[0m").count(), 3);
    }
}
