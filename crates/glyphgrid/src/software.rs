//! CPU implementation of [`Device`].
//!
//! Textures are `image::RgbaImage`s owned by the device and addressed by
//! handle. It is the reference the GPU backend is checked against, and it
//! lets the whole pipeline run headless in tests and in the CLI.

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::compositor::{self, CompositorInputs, CompositorUniforms};
use crate::device::{expect_upload_len, BlendMode, Device, DrawOptions, FilterMode};
use crate::error::{RenderError, Result};
use crate::palette::Rgba8;

/// Handle to a texture owned by a [`SoftwareDevice`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoftTexture(usize);

#[derive(Clone, Debug)]
pub struct SoftCompositor {
    label: String,
}

impl SoftCompositor {
    pub fn label(&self) -> &str {
        &self.label
    }
}

#[derive(Default)]
pub struct SoftwareDevice {
    textures: Vec<RgbaImage>,
    labels: Vec<String>,
    uploads: usize,
    draws: usize,
}

impl SoftwareDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, texture: &SoftTexture) -> &RgbaImage {
        &self.textures[texture.0]
    }

    pub fn label(&self, texture: &SoftTexture) -> &str {
        &self.labels[texture.0]
    }

    pub fn pixel(&self, texture: &SoftTexture, x: u32, y: u32) -> Rgba8 {
        Rgba8::from_array(self.image(texture).get_pixel(x, y).0)
    }

    /// Number of `write_texture` calls so far.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    /// Number of `draw_scaled` and `run_compositor` calls so far.
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    fn take(&mut self, texture: &SoftTexture) -> RgbaImage {
        std::mem::replace(&mut self.textures[texture.0], RgbaImage::new(0, 0))
    }
}

impl Device for SoftwareDevice {
    type Texture = SoftTexture;
    type Compositor = SoftCompositor;

    fn create_texture(&mut self, label: &str, width: u32, height: u32) -> Result<SoftTexture> {
        self.textures.push(RgbaImage::new(width, height));
        self.labels.push(label.to_string());
        debug!(label, width, height, "created software texture");
        Ok(SoftTexture(self.textures.len() - 1))
    }

    fn texture_size(&self, texture: &SoftTexture) -> (u32, u32) {
        self.image(texture).dimensions()
    }

    fn write_texture(&mut self, texture: &SoftTexture, pixels: &[u8]) -> Result<()> {
        let img = &mut self.textures[texture.0];
        expect_upload_len(img.width(), img.height(), pixels)?;
        img.copy_from_slice(pixels);
        self.uploads += 1;
        Ok(())
    }

    fn clear(&mut self, texture: &SoftTexture, color: Rgba8) -> Result<()> {
        let px = Rgba(color.to_array());
        for p in self.textures[texture.0].pixels_mut() {
            *p = px;
        }
        Ok(())
    }

    fn draw_scaled(
        &mut self,
        src: &SoftTexture,
        dst: &SoftTexture,
        options: &DrawOptions,
    ) -> Result<()> {
        if options.scale_x == 0 || options.scale_y == 0 {
            return Err(RenderError::Device(format!(
                "draw scale must be positive, got {}x{}",
                options.scale_x, options.scale_y
            )));
        }
        let source = if src == dst {
            self.image(src).clone()
        } else {
            self.take(src)
        };
        let mut target = self.take(dst);

        let (sw, sh) = source.dimensions();
        let w = target.width().min(sw * options.scale_x);
        let h = target.height().min(sh * options.scale_y);
        for y in 0..h {
            for x in 0..w {
                let texel = match options.filter {
                    FilterMode::Nearest => {
                        source.get_pixel(x / options.scale_x, y / options.scale_y).0
                    }
                    FilterMode::Linear => sample_linear(&source, x, y, options),
                };
                let out = match options.blend {
                    BlendMode::Replace => texel,
                    BlendMode::SourceOver => blend_over(texel, target.get_pixel(x, y).0),
                };
                target.put_pixel(x, y, Rgba(out));
            }
        }

        self.textures[dst.0] = target;
        if src != dst {
            self.textures[src.0] = source;
        }
        self.draws += 1;
        Ok(())
    }

    fn create_compositor(&mut self, label: &str, source: &str) -> Result<SoftCompositor> {
        if !source.contains("fn fs_main") {
            return Err(RenderError::Shader {
                label: label.to_string(),
                reason: "missing fragment entry point `fs_main`".into(),
            });
        }
        Ok(SoftCompositor {
            label: label.to_string(),
        })
    }

    fn run_compositor(
        &mut self,
        _program: &SoftCompositor,
        dst: &SoftTexture,
        inputs: CompositorInputs<'_, SoftTexture>,
        uniforms: CompositorUniforms,
    ) -> Result<()> {
        if [inputs.atlas, inputs.runes, inputs.palette].contains(&dst) {
            return Err(RenderError::Device(
                "compositor target aliases one of its inputs".into(),
            ));
        }
        if uniforms.cell_width == 0 || uniforms.cell_height == 0 {
            return Err(RenderError::Device("compositor cell size is zero".into()));
        }
        let mut target = self.take(dst);
        let atlas = self.image(inputs.atlas);
        let runes = self.image(inputs.runes);
        let palette: Vec<Rgba8> = self
            .image(inputs.palette)
            .pixels()
            .map(|p| Rgba8::from_array(p.0))
            .collect();

        let index_at = |x: u32, y: u32| match runes.get_pixel_checked(x, y) {
            Some(p) => p.0,
            None => [0; 4],
        };
        let atlas_alpha = |x: u32, y: u32| atlas.get_pixel_checked(x, y).map_or(0, |p| p.0[3]);

        for (x, y, px) in target.enumerate_pixels_mut() {
            let out = compositor::shade(x, y, &uniforms, index_at, atlas_alpha, &palette);
            *px = Rgba(out.to_array());
        }

        self.textures[dst.0] = target;
        self.draws += 1;
        Ok(())
    }
}

fn sample_linear(source: &RgbaImage, x: u32, y: u32, options: &DrawOptions) -> [u8; 4] {
    let (sw, sh) = source.dimensions();
    let axis = |p: u32, scale: u32, len: u32| {
        let u = ((p as f32 + 0.5) / scale as f32 - 0.5).max(0.0);
        let i0 = (u.floor() as u32).min(len - 1);
        let i1 = (i0 + 1).min(len - 1);
        (i0, i1, u - u.floor())
    };
    let (x0, x1, fx) = axis(x, options.scale_x, sw);
    let (y0, y1, fy) = axis(y, options.scale_y, sh);

    let p00 = source.get_pixel(x0, y0).0;
    let p10 = source.get_pixel(x1, y0).0;
    let p01 = source.get_pixel(x0, y1).0;
    let p11 = source.get_pixel(x1, y1).0;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f32::from(p00[c]) * (1.0 - fx) + f32::from(p10[c]) * fx;
        let bottom = f32::from(p01[c]) * (1.0 - fx) + f32::from(p11[c]) * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round() as u8;
    }
    out
}

/// Source-over with the fixed-function alpha blend:
/// `rgb = src * sa + dst * (1 - sa)` and `a = sa + da * (1 - sa)`.
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    match src[3] {
        255 => return src,
        0 => return dst,
        _ => {}
    }
    let sa = f32::from(src[3]) / 255.0;
    let mix = |s: u8, d: u8| (f32::from(s) * sa + f32::from(d) * (1.0 - sa)).round() as u8;
    let mut out = [0u8; 4];
    for c in 0..3 {
        out[c] = mix(src[c], dst[c]);
    }
    out[3] = (f32::from(src[3]) + f32::from(dst[3]) * (1.0 - sa)).round() as u8;
    out
}
