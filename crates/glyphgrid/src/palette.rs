//! Named, deterministically ordered color palettes.
use std::collections::{BTreeMap, HashMap};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// 8-bit straight-alpha RGBA color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const OPAQUE_BLACK: Self = Self::rgb(0, 0, 0);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(px: [u8; 4]) -> Self {
        Self::from_array(px)
    }
}

static BASE_COLORS: Lazy<HashMap<&'static str, Rgba8>> = Lazy::new(|| {
    HashMap::from([
        ("white", Rgba8::rgb(255, 255, 255)),
        ("black", Rgba8::rgb(0, 0, 0)),
        ("red", Rgba8::rgb(255, 0, 0)),
        ("green", Rgba8::rgb(0, 255, 0)),
        ("blue", Rgba8::rgb(0, 0, 255)),
        ("yellow", Rgba8::rgb(255, 255, 0)),
        ("cyan", Rgba8::rgb(0, 255, 255)),
        ("magenta", Rgba8::rgb(255, 0, 255)),
        ("gray", Rgba8::rgb(128, 128, 128)),
        ("darkred", Rgba8::rgb(128, 0, 0)),
        ("darkgreen", Rgba8::rgb(0, 128, 0)),
        ("darkblue", Rgba8::rgb(0, 0, 128)),
        ("olive", Rgba8::rgb(128, 128, 0)),
        ("teal", Rgba8::rgb(0, 128, 128)),
        ("purple", Rgba8::rgb(128, 0, 128)),
        ("silver", Rgba8::rgb(192, 192, 192)),
    ])
});

/// Indexed colors with a name lookup.
///
/// Indices are assigned by sorting the names, so the same set of names
/// always produces the same indices no matter how it was assembled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba8>,
    names: Vec<String>,
}

impl Palette {
    /// Build a palette from `(name, color)` pairs. A repeated name keeps the
    /// color given last.
    pub fn build<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Rgba8)>,
        S: Into<String>,
    {
        let sorted: BTreeMap<String, Rgba8> = entries
            .into_iter()
            .map(|(name, color)| (name.into(), color))
            .collect();
        let (names, colors) = sorted.into_iter().unzip();
        Self { colors, names }
    }

    /// The 16 named base colors.
    pub fn base() -> Self {
        Self::build(BASE_COLORS.iter().map(|(name, color)| (*name, *color)))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color_at(&self, index: usize) -> Result<Rgba8> {
        self.colors
            .get(index)
            .copied()
            .ok_or(RenderError::PaletteIndex {
                index,
                len: self.colors.len(),
            })
    }

    pub fn index_of(&self, name: &str) -> Option<u8> {
        let idx = self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()?;
        u8::try_from(idx).ok()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, Rgba8)> + '_ {
        self.names
            .iter()
            .zip(&self.colors)
            .enumerate()
            .map(|(i, (name, color))| (i, name.as_str(), *color))
    }

    /// The palette as an N×1 RGBA image, one texel per index.
    pub fn texture_pixels(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.to_array()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_palette_is_alphabetical() {
        let palette = Palette::base();
        assert_eq!(palette.len(), 16);
        assert_eq!(palette.name_at(0), Some("black"));
        assert_eq!(palette.name_at(1), Some("blue"));
        assert_eq!(palette.name_at(15), Some("yellow"));
        assert_eq!(palette.index_of("white"), Some(14));
    }

    #[test]
    fn duplicate_name_keeps_last_color() {
        let palette = Palette::build([
            ("red", Rgba8::rgb(1, 0, 0)),
            ("red", Rgba8::rgb(2, 0, 0)),
        ]);
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.color_at(0).unwrap(), Rgba8::rgb(2, 0, 0));
    }

    #[test]
    fn texture_pixels_follow_index_order() {
        let palette = Palette::build([
            ("b", Rgba8::rgb(0, 0, 255)),
            ("a", Rgba8::new(1, 2, 3, 4)),
        ]);
        assert_eq!(palette.texture_pixels(), vec![1, 2, 3, 4, 0, 0, 255, 255]);
    }

    #[test]
    fn hex_formats_all_channels() {
        assert_eq!(Rgba8::new(0x12, 0x34, 0x56, 0x78).hex(), "#12345678");
    }
}
