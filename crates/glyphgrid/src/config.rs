//! TOML configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};
use crate::palette::Rgba8;

fn default_scale() -> u32 {
    1
}

fn default_font_size() -> f32 {
    8.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub logical_width: u32,
    pub logical_height: u32,
    #[serde(default = "default_scale")]
    pub scale: u32,
    /// RGBA components; anything but exactly four entries falls back to
    /// opaque black.
    #[serde(default)]
    pub clear_color: Vec<i64>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(|e| RenderError::Config(e.to_string()))?;
        if config.scale == 0 {
            return Err(RenderError::Config("scale must be at least 1".into()));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn clear_color_rgba(&self) -> Rgba8 {
        match self.clear_color.as_slice() {
            &[r, g, b, a] => {
                let c = |v: i64| v.clamp(0, 255) as u8;
                Rgba8::new(c(r), c(g), c(b), c(a))
            }
            _ => Rgba8::OPAQUE_BLACK,
        }
    }

    /// Grid dimensions that fit the logical size with the given cell size.
    pub fn grid_size(&self, cell_width: u32, cell_height: u32) -> (u32, u32) {
        (
            self.logical_width.checked_div(cell_width).unwrap_or(0),
            self.logical_height.checked_div(cell_height).unwrap_or(0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
logicalWidth = 640
logicalHeight = 400
scale = 2
clearColor = [10, 20, 30, 255]
"#;

    #[test]
    fn parses_camel_case_keys() {
        let config = Config::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.logical_width, 640);
        assert_eq!(config.scale, 2);
        assert_eq!(config.font, None);
        assert_eq!(config.font_size, 8.0);
        assert_eq!(config.clear_color_rgba(), Rgba8::new(10, 20, 30, 255));
        assert_eq!(config.grid_size(8, 16), (80, 25));
    }

    #[test]
    fn clear_color_components_are_clamped() {
        let config =
            Config::from_toml_str("logicalWidth = 1\nlogicalHeight = 1\nclearColor = [-5, 300, 7, 128]")
                .unwrap();
        assert_eq!(config.clear_color_rgba(), Rgba8::new(0, 255, 7, 128));
    }

    #[test]
    fn malformed_clear_color_is_opaque_black() {
        for color in ["[]", "[1, 2, 3]", "[1, 2, 3, 4, 5]"] {
            let text = format!("logicalWidth = 1\nlogicalHeight = 1\nclearColor = {color}");
            let config = Config::from_toml_str(&text).unwrap();
            assert_eq!(config.clear_color_rgba(), Rgba8::OPAQUE_BLACK, "{color}");
        }
    }

    #[test]
    fn zero_scale_is_rejected() {
        let err = Config::from_toml_str("logicalWidth = 1\nlogicalHeight = 1\nscale = 0")
            .unwrap_err();
        assert!(matches!(err, RenderError::Config(_)));
    }
}
