//! glyphgrid: fixed-cell glyph grid renderer.
//! A cell grid becomes two per-cell data textures that one compositor pass
//! resolves against a glyph atlas and a palette texture.

mod atlas;
mod buffers;
pub mod compositor;
pub mod config;
mod device;
mod error;
pub mod face;
mod glyph;
#[cfg(feature = "wgpu")]
pub mod gpu;
mod palette;
mod renderer;
pub mod resources;
mod software;

// Test utilities
pub mod test_support;

pub use atlas::{AtlasRect, GlyphAtlas, GlyphView, REFERENCE_GLYPH};
pub use buffers::{atlas_slot, BackgroundBuffer, RuneBuffer, RuneTexel};
pub use compositor::CompositorUniforms;
pub use config::Config;
pub use device::{BlendMode, Device, DrawOptions, FilterMode};
pub use error::{RenderError, Result};
#[cfg(feature = "fonts")]
pub use face::FontFace;
pub use face::{BitmapFace, GlyphBitmap, GlyphFace};
pub use glyph::{Glyph, GlyphGrid};
pub use palette::{Palette, Rgba8};
pub use renderer::{FrameStats, GlyphRenderer, RendererOptions};
pub use resources::ResourceManager;
pub use software::{SoftCompositor, SoftTexture, SoftwareDevice};

/// First character code held by the atlas (`' '`).
pub const FIRST_PRINTABLE: u32 = 32;
/// Last character code held by the atlas (`'~'`).
pub const LAST_PRINTABLE: u32 = 126;
/// Number of atlas slots.
pub const RUNE_COUNT: u32 = LAST_PRINTABLE - FIRST_PRINTABLE + 1;
