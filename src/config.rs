//! Runtime configuration, read from an optional JSON file.
//!
//! Every field has a default, so `{}` (or no file at all) is a valid config.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PadError, PadResult};
use crate::raster::{DownsampleFilter, Thickening};

/// Which input widget the pad shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Checkbox,
    #[default]
    Canvas,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "checkbox" => Ok(Variant::Checkbox),
            "canvas" => Ok(Variant::Canvas),
            other => Err(format!("unknown variant '{}', expected checkbox or canvas", other)),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Checkbox => write!(f, "checkbox"),
            Variant::Canvas => write!(f, "canvas"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// Address the HTTP front end binds to.
    pub addr: String,
    pub model_dir: PathBuf,
    /// Model stem to load at startup; the first listed model when unset.
    pub model: Option<String>,
    pub variant: Variant,
    /// Canvas magnification over the 28×28 grid.
    pub canvas_scale: u32,
    /// Brush radius in canvas pixels, used when a move event carries none.
    pub brush_radius: f64,
    pub filter: DownsampleFilter,
    pub thickening: Thickening,
    /// Upscale factor for feature-map PNGs.
    pub feature_scale: u32,
}

impl Default for PadConfig {
    fn default() -> Self {
        PadConfig {
            addr: "127.0.0.1:7878".into(),
            model_dir: PathBuf::from("trained_models"),
            model: None,
            variant: Variant::default(),
            canvas_scale: 10,
            brush_radius: 12.0,
            filter: DownsampleFilter::default(),
            thickening: Thickening::default(),
            feature_scale: 4,
        }
    }
}

impl PadConfig {
    pub fn load(path: &Path) -> PadResult<PadConfig> {
        let text = std::fs::read_to_string(path).map_err(|e| PadError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: PadConfig = serde_json::from_str(&text).map_err(|e| PadError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.check(path)?;
        Ok(config)
    }

    fn check(&self, path: &Path) -> PadResult<()> {
        let bad = |reason: String| PadError::Config { path: path.to_path_buf(), reason };
        if self.canvas_scale == 0 {
            return Err(bad("canvas_scale must be at least 1".into()));
        }
        if !self.brush_radius.is_finite() || self.brush_radius <= 0.0 {
            return Err(bad(format!("brush_radius must be positive, got {}", self.brush_radius)));
        }
        Ok(())
    }
}
