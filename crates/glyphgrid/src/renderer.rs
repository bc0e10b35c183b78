//! Frame orchestration.
//!
//! Per frame, in this order: background rebuild + upload, index rebuild +
//! upload, nearest upscale of the index texture to full resolution, one
//! compositor pass into the foreground texture. `draw` then lays the
//! background (scaled by the cell size) and the foreground over the target.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::atlas::GlyphAtlas;
use crate::buffers::{BackgroundBuffer, RuneBuffer};
use crate::compositor::{CompositorInputs, CompositorUniforms, COMPOSITOR_WGSL};
use crate::device::{BlendMode, Device, DrawOptions, FilterMode};
use crate::error::{RenderError, Result};
use crate::face::GlyphFace;
use crate::glyph::GlyphGrid;
use crate::palette::{Palette, Rgba8};

#[derive(Clone, Debug, Default)]
pub struct RendererOptions {
    /// Filter for scaling the background up to cell size. The index texture
    /// is always upscaled with [`FilterMode::Nearest`].
    pub background_filter: FilterMode,
    /// WGSL override for the compositor program.
    pub compositor_source: Option<String>,
}

/// Work done by one `update`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub cells: u32,
    pub uploaded_bytes: usize,
}

pub struct GlyphRenderer<D: Device> {
    atlas: GlyphAtlas,
    palette: Arc<Palette>,
    background: BackgroundBuffer<D>,
    runes: RuneBuffer<D>,
    atlas_texture: D::Texture,
    palette_texture: D::Texture,
    scaled_runes: D::Texture,
    foreground: D::Texture,
    compositor: D::Compositor,
    options: RendererOptions,
    cols: u32,
    rows: u32,
}

impl<D: Device> GlyphRenderer<D> {
    pub fn new<F: GlyphFace + ?Sized>(
        device: &mut D,
        cols: u32,
        rows: u32,
        palette: Arc<Palette>,
        face: &F,
        options: RendererOptions,
    ) -> Result<Self> {
        if palette.is_empty() || palette.len() > 256 {
            return Err(RenderError::PaletteSize(palette.len()));
        }
        let atlas = GlyphAtlas::build(face)?;

        let atlas_texture = device.create_texture("atlas", atlas.width(), atlas.height())?;
        device.write_texture(&atlas_texture, atlas.pixels())?;

        let palette_texture = device.create_texture("palette", palette.len() as u32, 1)?;
        device.write_texture(&palette_texture, &palette.texture_pixels())?;

        let background = BackgroundBuffer::new(device, cols, rows)?;
        let runes = RuneBuffer::new(device, cols, rows)?;

        let (width, height) = (cols * atlas.cell_width(), rows * atlas.cell_height());
        let scaled_runes = device.create_texture("runes_scaled", width, height)?;
        let foreground = device.create_texture("foreground", width, height)?;

        let source = options
            .compositor_source
            .as_deref()
            .unwrap_or(COMPOSITOR_WGSL);
        let compositor = device.create_compositor("compositor", source)?;

        debug!(cols, rows, width, height, palette = palette.len(), "glyph renderer ready");
        Ok(Self {
            atlas,
            palette,
            background,
            runes,
            atlas_texture,
            palette_texture,
            scaled_runes,
            foreground,
            compositor,
            options,
            cols,
            rows,
        })
    }

    /// Rebuild the frame's buffers from `grid` and run the compositor.
    pub fn update(&mut self, device: &mut D, grid: &GlyphGrid) -> Result<FrameStats> {
        if grid.cols() != self.cols || grid.rows() != self.rows {
            return Err(RenderError::GridMismatch {
                cols: self.cols,
                rows: self.rows,
                actual_cols: grid.cols(),
                actual_rows: grid.rows(),
            });
        }
        if !Arc::ptr_eq(grid.palette(), &self.palette) && **grid.palette() != *self.palette {
            return Err(RenderError::PaletteMismatch);
        }
        if grid.is_empty() {
            return Ok(FrameStats::default());
        }

        // Validate both encodings before touching either texture.
        self.background.encode(grid)?;
        self.runes.encode(grid)?;
        self.background.upload(device)?;
        self.runes.upload(device)?;

        let uniforms = self.uniforms();
        device.clear(&self.scaled_runes, Rgba8::TRANSPARENT)?;
        device.draw_scaled(
            self.runes.texture(),
            &self.scaled_runes,
            &DrawOptions::scaled(
                uniforms.cell_width,
                uniforms.cell_height,
                FilterMode::Nearest,
                BlendMode::Replace,
            ),
        )?;

        device.clear(&self.foreground, Rgba8::TRANSPARENT)?;
        device.run_compositor(
            &self.compositor,
            &self.foreground,
            CompositorInputs {
                atlas: &self.atlas_texture,
                runes: &self.scaled_runes,
                palette: &self.palette_texture,
            },
            uniforms,
        )?;

        let stats = FrameStats {
            cells: self.cols * self.rows,
            uploaded_bytes: self.background.pixels().len() + self.runes.pixels().len(),
        };
        trace!(?stats, "frame updated");
        Ok(stats)
    }

    /// Composite background, then foreground, onto `target`.
    pub fn draw(&self, device: &mut D, target: &D::Texture) -> Result<()> {
        if self.cols == 0 || self.rows == 0 {
            return Ok(());
        }
        device.draw_scaled(
            self.background.texture(),
            target,
            &DrawOptions::scaled(
                self.atlas.cell_width(),
                self.atlas.cell_height(),
                self.options.background_filter,
                BlendMode::SourceOver,
            ),
        )?;
        device.draw_scaled(&self.foreground, target, &DrawOptions::over())
    }

    pub fn uniforms(&self) -> CompositorUniforms {
        CompositorUniforms {
            cols: self.cols,
            rows: self.rows,
            cell_width: self.atlas.cell_width(),
            cell_height: self.atlas.cell_height(),
        }
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Full-resolution output size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        self.uniforms().pixel_size()
    }

    pub fn background(&self) -> &BackgroundBuffer<D> {
        &self.background
    }

    pub fn runes(&self) -> &RuneBuffer<D> {
        &self.runes
    }

    pub fn scaled_runes(&self) -> &D::Texture {
        &self.scaled_runes
    }

    pub fn foreground(&self) -> &D::Texture {
        &self.foreground
    }
}
