//! The GPU boundary.
//!
//! Everything the renderer does to pixels goes through [`Device`]: texture
//! uploads, clears, scaled draws and the compositor pass. Filtering is always
//! passed explicitly; no implementation may fall back to a host default.

use crate::compositor::{CompositorInputs, CompositorUniforms};
use crate::error::Result;
use crate::palette::Rgba8;

/// Texel filter used when a draw scales its source.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FilterMode {
    /// Each destination pixel takes exactly one source texel.
    #[default]
    Nearest,
    /// Bilinear interpolation between texel centers.
    Linear,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Overwrite destination pixels.
    Replace,
    /// "Over" compositing: `rgb = src * sa + dst * (1 - sa)`, `a = sa + da * (1 - sa)`.
    #[default]
    SourceOver,
}

/// A draw of `src` onto the destination origin, scaled by an integer factor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DrawOptions {
    pub scale_x: u32,
    pub scale_y: u32,
    pub filter: FilterMode,
    pub blend: BlendMode,
}

impl DrawOptions {
    pub fn scaled(scale_x: u32, scale_y: u32, filter: FilterMode, blend: BlendMode) -> Self {
        Self {
            scale_x,
            scale_y,
            filter,
            blend,
        }
    }

    /// Unscaled source-over draw.
    pub fn over() -> Self {
        Self::scaled(1, 1, FilterMode::Nearest, BlendMode::SourceOver)
    }
}

pub trait Device {
    type Texture;
    type Compositor;

    /// Allocate an RGBA8 texture, initially transparent.
    fn create_texture(&mut self, label: &str, width: u32, height: u32) -> Result<Self::Texture>;

    fn texture_size(&self, texture: &Self::Texture) -> (u32, u32);

    /// Replace the full contents of `texture`; `pixels` must hold exactly
    /// `width * height * 4` bytes.
    fn write_texture(&mut self, texture: &Self::Texture, pixels: &[u8]) -> Result<()>;

    fn clear(&mut self, texture: &Self::Texture, color: Rgba8) -> Result<()>;

    /// Draw `src` at the origin of `dst`, scaled and clipped to `dst`.
    fn draw_scaled(
        &mut self,
        src: &Self::Texture,
        dst: &Self::Texture,
        options: &DrawOptions,
    ) -> Result<()>;

    fn create_compositor(&mut self, label: &str, source: &str) -> Result<Self::Compositor>;

    /// Run the compositor over the uniforms' pixel footprint of `dst`.
    fn run_compositor(
        &mut self,
        program: &Self::Compositor,
        dst: &Self::Texture,
        inputs: CompositorInputs<'_, Self::Texture>,
        uniforms: CompositorUniforms,
    ) -> Result<()>;
}

/// Checks an upload against the texture size.
pub(crate) fn expect_upload_len(width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    let expected = width as usize * height as usize * 4;
    if pixels.len() != expected {
        return Err(crate::RenderError::UploadSize {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
