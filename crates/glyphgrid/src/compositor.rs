//! The compositor program contract.
//!
//! Inputs: the glyph atlas, the index texture upscaled to full resolution,
//! and an N×1 palette lookup texture. Uniforms: `cols`, `rows`,
//! `cell_width`, `cell_height`. For every output pixel the program finds
//! its cell and the position inside it, decodes the cell's atlas slot and
//! foreground index, reads the atlas coverage at `slot * cell_width + lx`,
//! and emits the palette color with its alpha scaled by that coverage.
//!
//! [`shade`] is the CPU form of the same function; the software device
//! runs it and the WGSL below must agree with it pixel for pixel.

use crate::buffers::RuneTexel;
use crate::palette::Rgba8;

/// Size of [`CompositorUniforms`] on the GPU (one `vec4<u32>`).
pub const UNIFORM_BYTES: usize = 16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositorUniforms {
    pub cols: u32,
    pub rows: u32,
    pub cell_width: u32,
    pub cell_height: u32,
}

impl CompositorUniforms {
    /// Output footprint in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.cols * self.cell_width, self.rows * self.cell_height)
    }

    /// Little-endian bytes matching the WGSL `Grid` struct.
    #[must_use]
    pub fn to_bytes(self) -> [u8; UNIFORM_BYTES] {
        let mut buf = [0u8; UNIFORM_BYTES];
        buf[0..4].copy_from_slice(&self.cols.to_le_bytes());
        buf[4..8].copy_from_slice(&self.rows.to_le_bytes());
        buf[8..12].copy_from_slice(&self.cell_width.to_le_bytes());
        buf[12..16].copy_from_slice(&self.cell_height.to_le_bytes());
        buf
    }
}

/// Textures bound to one compositor invocation.
pub struct CompositorInputs<'a, T> {
    pub atlas: &'a T,
    pub runes: &'a T,
    pub palette: &'a T,
}

/// Resolve one output pixel.
///
/// `index_at` reads the upscaled index texture, `atlas_alpha` the atlas
/// coverage (returning 0 outside the canvas), and `palette` the lookup
/// table. A foreground index past the end of the palette is clamped to
/// the last entry, the same as a clamped texture load on the GPU.
pub fn shade(
    x: u32,
    y: u32,
    uniforms: &CompositorUniforms,
    index_at: impl Fn(u32, u32) -> [u8; 4],
    atlas_alpha: impl Fn(u32, u32) -> u8,
    palette: &[Rgba8],
) -> Rgba8 {
    let (width, height) = uniforms.pixel_size();
    if x >= width || y >= height || palette.is_empty() {
        return Rgba8::TRANSPARENT;
    }
    let lx = x % uniforms.cell_width;
    let ly = y % uniforms.cell_height;

    let texel = RuneTexel::decode(index_at(x, y));
    let coverage = atlas_alpha(u32::from(texel.slot) * uniforms.cell_width + lx, ly);
    let fg = palette[usize::from(texel.fg).min(palette.len() - 1)];

    Rgba8::new(fg.r, fg.g, fg.b, mul_u8(fg.a, coverage))
}

/// `a * b / 255`, rounded.
pub(crate) fn mul_u8(a: u8, b: u8) -> u8 {
    let t = u32::from(a) * u32::from(b) + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// Compositor program. Entry points `vs_main` / `fs_main`.
pub const COMPOSITOR_WGSL: &str = r#"
struct Grid {
    // (cols, rows, cell_width, cell_height)
    dims: vec4<u32>,
}

@group(0) @binding(0) var<uniform> grid: Grid;
@group(0) @binding(1) var atlas: texture_2d<f32>;
@group(0) @binding(2) var runes: texture_2d<f32>;
@group(0) @binding(3) var palette: texture_2d<f32>;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    // Full-target triangle pair.
    var quad = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(-1.0, 1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    var out: VertexOutput;
    out.position = vec4<f32>(quad[vertex_index], 0.0, 1.0);
    return out;
}

fn decode(v: f32) -> u32 {
    return u32(round(v * 255.0));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let cols = grid.dims.x;
    let rows = grid.dims.y;
    let cell_w = grid.dims.z;
    let cell_h = grid.dims.w;

    let px = vec2<u32>(floor(in.position.xy));
    if (px.x >= cols * cell_w || px.y >= rows * cell_h) {
        return vec4<f32>(0.0);
    }
    let local = vec2<u32>(px.x % cell_w, px.y % cell_h);

    let texel = textureLoad(runes, vec2<i32>(px), 0);
    let slot = decode(texel.r);
    let fg_index = decode(texel.g);

    let atlas_px = vec2<u32>(slot * cell_w + local.x, local.y);
    let atlas_size = textureDimensions(atlas);
    var coverage = 0.0;
    if (atlas_px.x < atlas_size.x && atlas_px.y < atlas_size.y) {
        coverage = textureLoad(atlas, vec2<i32>(atlas_px), 0).a;
    }

    let palette_len = textureDimensions(palette).x;
    let fg = textureLoad(palette, vec2<i32>(i32(min(fg_index, palette_len - 1u)), 0), 0);
    return vec4<f32>(fg.rgb, fg.a * coverage);
}
"#;

/// Scaled texture copy used for the upscale and final draws.
pub const BLIT_WGSL: &str = r#"
struct Blit {
    // (target_width, target_height, quad_width, quad_height)
    size: vec4<f32>,
}

@group(0) @binding(0) var<uniform> blit: Blit;
@group(0) @binding(1) var source: texture_2d<f32>;
@group(0) @binding(2) var source_sampler: sampler;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32) -> VertexOutput {
    var quad = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(0.0, 1.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 1.0),
    );
    let q = quad[vertex_index];
    let px = q * blit.size.zw;
    var out: VertexOutput;
    out.position = vec4<f32>(
        (px.x / blit.size.x) * 2.0 - 1.0,
        1.0 - (px.y / blit.size.y) * 2.0,
        0.0,
        1.0,
    );
    out.uv = q;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(source, source_sampler, in.uv);
}
"#;
