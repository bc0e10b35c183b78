use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("palette index {index} out of range (palette has {len} colors)")]
    PaletteIndex { index: usize, len: usize },
    #[error("palette must hold between 1 and 256 colors, got {0}")]
    PaletteSize(usize),
    #[error("grid palette differs from the renderer's palette")]
    PaletteMismatch,
    #[error("grid is {actual_cols}x{actual_rows}, expected {cols}x{rows}")]
    GridMismatch {
        cols: u32,
        rows: u32,
        actual_cols: u32,
        actual_rows: u32,
    },
    #[error("texture upload of {actual} bytes, expected {expected}")]
    UploadSize { expected: usize, actual: usize },
    #[error("sub-image {rect:?} out of bounds {width}x{height} for {name:?}")]
    SubImageOutOfBounds {
        name: String,
        rect: [u32; 4],
        width: u32,
        height: u32,
    },
    #[error("font error: {0}")]
    Font(String),
    #[error("device error: {0}")]
    Device(String),
    #[error("shader {label:?}: {reason}")]
    Shader { label: String, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to load {kind} {path:?}: {reason}")]
    Resource {
        kind: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
