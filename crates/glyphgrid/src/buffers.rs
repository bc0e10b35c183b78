//! Per-frame cell data textures.
//!
//! Both buffers hold one RGBA texel per grid cell, are rewritten in full
//! from the grid every frame and uploaded to their device texture in a
//! single transfer. Nothing is dirty-tracked.

use crate::device::Device;
use crate::error::{RenderError, Result};
use crate::glyph::GlyphGrid;
use crate::palette::Rgba8;
use crate::{FIRST_PRINTABLE, LAST_PRINTABLE};

/// Atlas slot for `ch`. Characters outside the printable range, including
/// the grid's default `'\0'`, map to the blank slot of `' '`.
pub fn atlas_slot(ch: char) -> u8 {
    let code = u32::from(ch);
    if (FIRST_PRINTABLE..=LAST_PRINTABLE).contains(&code) {
        (code - FIRST_PRINTABLE) as u8
    } else {
        0
    }
}

/// One decoded index-texture texel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RuneTexel {
    /// Position of the glyph in the atlas.
    pub slot: u8,
    /// Foreground palette index.
    pub fg: u8,
    /// Reserved for per-cell effect flags, currently always 0.
    pub effect: u8,
}

impl RuneTexel {
    pub fn encode(self) -> [u8; 4] {
        [self.slot, self.fg, self.effect, 0xFF]
    }

    pub fn decode(px: [u8; 4]) -> Self {
        Self {
            slot: px[0],
            fg: px[1],
            effect: px[2],
        }
    }
}

fn check_dims(cols: u32, rows: u32, grid: &GlyphGrid) -> Result<()> {
    if grid.cols() != cols || grid.rows() != rows {
        return Err(RenderError::GridMismatch {
            cols,
            rows,
            actual_cols: grid.cols(),
            actual_rows: grid.rows(),
        });
    }
    Ok(())
}

fn check_index(index: u8, len: usize) -> Result<()> {
    if usize::from(index) >= len {
        return Err(RenderError::PaletteIndex {
            index: usize::from(index),
            len,
        });
    }
    Ok(())
}

/// Low-resolution background colors, one texel per cell.
pub struct BackgroundBuffer<D: Device> {
    pixels: Vec<u8>,
    texture: D::Texture,
    cols: u32,
    rows: u32,
}

impl<D: Device> BackgroundBuffer<D> {
    pub fn new(device: &mut D, cols: u32, rows: u32) -> Result<Self> {
        Ok(Self {
            pixels: vec![0; cols as usize * rows as usize * 4],
            texture: device.create_texture("background", cols, rows)?,
            cols,
            rows,
        })
    }

    /// Rewrite the pixel array from the grid's background indices.
    pub fn encode(&mut self, grid: &GlyphGrid) -> Result<()> {
        check_dims(self.cols, self.rows, grid)?;
        let palette = grid.palette();
        for (glyph, px) in grid.cells().iter().zip(self.pixels.chunks_exact_mut(4)) {
            let color = palette.color_at(usize::from(glyph.bg))?;
            px.copy_from_slice(&color.to_array());
        }
        Ok(())
    }

    pub fn rebuild(&mut self, device: &mut D, grid: &GlyphGrid) -> Result<()> {
        self.encode(grid)?;
        self.upload(device)
    }

    /// Write the current pixel array to the texture.
    pub fn upload(&self, device: &mut D) -> Result<()> {
        device.write_texture(&self.texture, &self.pixels)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// # Panics
    /// Panics if `(col, row)` lies outside the buffer.
    pub fn texel(&self, col: u32, row: u32) -> Rgba8 {
        let base = texel_offset(self.cols, self.rows, col, row);
        Rgba8::new(
            self.pixels[base],
            self.pixels[base + 1],
            self.pixels[base + 2],
            self.pixels[base + 3],
        )
    }

    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }
}

/// Index texture: per cell the glyph's atlas slot and foreground index.
pub struct RuneBuffer<D: Device> {
    pixels: Vec<u8>,
    texture: D::Texture,
    cols: u32,
    rows: u32,
}

impl<D: Device> RuneBuffer<D> {
    pub fn new(device: &mut D, cols: u32, rows: u32) -> Result<Self> {
        Ok(Self {
            pixels: vec![0; cols as usize * rows as usize * 4],
            texture: device.create_texture("runes", cols, rows)?,
            cols,
            rows,
        })
    }

    /// Rewrite the pixel array as `(slot, fg, 0, 255)` per cell.
    pub fn encode(&mut self, grid: &GlyphGrid) -> Result<()> {
        check_dims(self.cols, self.rows, grid)?;
        let len = grid.palette().len();
        for (glyph, px) in grid.cells().iter().zip(self.pixels.chunks_exact_mut(4)) {
            check_index(glyph.fg, len)?;
            let texel = RuneTexel {
                slot: atlas_slot(glyph.ch),
                fg: glyph.fg,
                effect: 0,
            };
            px.copy_from_slice(&texel.encode());
        }
        Ok(())
    }

    pub fn rebuild(&mut self, device: &mut D, grid: &GlyphGrid) -> Result<()> {
        self.encode(grid)?;
        self.upload(device)
    }

    /// Write the current pixel array to the texture.
    pub fn upload(&self, device: &mut D) -> Result<()> {
        device.write_texture(&self.texture, &self.pixels)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// # Panics
    /// Panics if `(col, row)` lies outside the buffer.
    pub fn texel(&self, col: u32, row: u32) -> RuneTexel {
        let base = texel_offset(self.cols, self.rows, col, row);
        RuneTexel::decode([
            self.pixels[base],
            self.pixels[base + 1],
            self.pixels[base + 2],
            self.pixels[base + 3],
        ])
    }

    pub fn texture(&self) -> &D::Texture {
        &self.texture
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }
}

fn texel_offset(cols: u32, rows: u32, col: u32, row: u32) -> usize {
    assert!(
        col < cols && row < rows,
        "texel ({col}, {row}) outside {cols}x{rows} buffer"
    );
    (row as usize * cols as usize + col as usize) * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_code_points() {
        assert_eq!(atlas_slot(' '), 0);
        assert_eq!(atlas_slot('A'), 33);
        assert_eq!(atlas_slot('~'), 94);
        assert_eq!(atlas_slot('\0'), 0);
        assert_eq!(atlas_slot('é'), 0);
    }

    #[test]
    fn texel_alpha_is_opaque() {
        let px = RuneTexel {
            slot: 5,
            fg: 7,
            effect: 0,
        }
        .encode();
        assert_eq!(px, [5, 7, 0, 255]);
    }
}
