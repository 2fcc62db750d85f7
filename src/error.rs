//! Error type shared by every ferrite-pad module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while capturing input, loading models, or rendering results.
#[derive(Debug, Error)]
pub enum PadError {
    /// A checkbox cell outside the 28×28 grid was addressed.
    #[error("cell ({row}, {col}) is outside the {size}x{size} grid")]
    CellOutOfRange { row: usize, col: usize, size: usize },

    /// Brush radius was zero, negative, or not finite.
    #[error("invalid brush radius: {0}")]
    InvalidBrush(f64),

    /// A stroke point with a NaN or infinite coordinate.
    #[error("invalid stroke point ({x}, {y})")]
    InvalidPoint { x: f64, y: f64 },

    /// The model directory has no model with this name (or no models at all).
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Model names are file stems; separators and `..` are refused.
    #[error("invalid model name: {0:?}")]
    InvalidModelName(String),

    #[error("failed to read {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model {path}: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The model's layer sizes do not chain from a 28×28 input to 10 classes.
    #[error("model shape mismatch: {0}")]
    ModelShape(String),

    /// A feature map whose values do not fill `width × height`.
    #[error("feature map is {width}x{height} but holds {len} values")]
    FeatureMapShape { width: usize, height: usize, len: usize },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to load config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// A required UI element or asset is missing at startup.
    #[error("missing required asset: {0}")]
    MissingAsset(&'static str),
}

/// Result alias used throughout the crate.
pub type PadResult<T> = std::result::Result<T, PadError>;
