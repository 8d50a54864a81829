//! Configuration for raster-compose.
//!
//! Encoding defaults live in [`ImageConfig`], an explicit value passed to
//! the encoder and carried by every [`ImageSource`](crate::ImageSource).
//! The binary resolves it once at startup from, in increasing priority:
//!
//! - built-in defaults
//! - a JSON file given with `--config`
//! - command-line flags and `RASTER_*` environment variables
//!
//! # Environment Variables
//!
//! - `RASTER_PALETTED` - Quantize PNG/GIF output to a palette (default: true)
//! - `RASTER_JPEG_QUALITY` - JPEG quality 1-100 (default: 90)
//! - `RASTER_CONFIG` - Path to a JSON configuration file
//!
//! # Example
//!
//! ```
//! use raster_compose::config::ImageConfig;
//!
//! let config: ImageConfig = serde_json::from_str(r#"{"jpeg_quality": 75}"#).unwrap();
//! assert!(config.paletted);
//! assert_eq!(config.jpeg_quality, 75);
//! ```

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::codec::{is_valid_quality, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};

// =============================================================================
// Default Values
// =============================================================================

/// Palette quantization for PNG/GIF output is on unless disabled.
pub const DEFAULT_PALETTED: bool = true;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Default output format of a merge.
pub const DEFAULT_FORMAT: &str = "png";

/// Default background color of a merge.
pub const DEFAULT_BGCOLOR: &str = "#ffffff";

// =============================================================================
// Image Configuration
// =============================================================================

/// Encoding defaults applied when a caller does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Quantize PNG and GIF output to an adaptive palette.
    pub paletted: bool,

    /// Quality used for JPEG output.
    pub jpeg_quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            paletted: DEFAULT_PALETTED,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {}", path.display(), e))
    }

    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if !is_valid_quality(self.jpeg_quality) {
            return Err(format!(
                "jpeg_quality must be between {} and {}",
                MIN_JPEG_QUALITY, MAX_JPEG_QUALITY
            ));
        }
        Ok(())
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// raster-compose - merge and re-encode raster tiles.
#[derive(Parser, Debug, Clone)]
#[command(name = "raster-compose")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file with image defaults (`paletted`, `jpeg_quality`).
    #[arg(long, global = true, env = "RASTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Quantize PNG/GIF output to a palette.
    #[arg(long, global = true, env = "RASTER_PALETTED", action = ArgAction::Set)]
    pub paletted: Option<bool>,

    /// JPEG quality (1-100).
    #[arg(long, global = true, env = "RASTER_JPEG_QUALITY")]
    pub jpeg_quality: Option<u8>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Merge image files bottom-to-top into one output image.
    Merge(MergeArgs),

    /// Print format, dimensions and color information as JSON.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Input layers, bottom layer first.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format. Defaults to the output file extension.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output size as WIDTHxHEIGHT. Defaults to the first layer's size.
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Background color.
    #[arg(long, default_value = DEFAULT_BGCOLOR)]
    pub bgcolor: String,

    /// Produce a transparent result.
    #[arg(long, default_value_t = false)]
    pub transparent: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Images to inspect.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

impl Cli {
    /// Resolve the image configuration: file first, then flags/env on top.
    pub fn image_config(&self) -> Result<ImageConfig, String> {
        let mut config = match &self.config {
            Some(path) => ImageConfig::from_json_file(path)?,
            None => ImageConfig::default(),
        };
        if let Some(paletted) = self.paletted {
            config.paletted = paletted;
        }
        if let Some(quality) = self.jpeg_quality {
            config.jpeg_quality = quality;
        }
        config.validate()?;
        Ok(config)
    }
}

impl MergeArgs {
    /// Output format: explicit `--format`, else the output extension, else png.
    pub fn output_format(&self) -> String {
        self.format
            .clone()
            .or_else(|| {
                self.output
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.to_ascii_lowercase())
            })
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
    }
}

/// Parse `WIDTHxHEIGHT`.
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", value))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width {:?}: {}", width, e))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height {:?}: {}", height, e))?;
    if width == 0 || height == 0 {
        return Err("size must be non-zero".to_string());
    }
    Ok((width, height))
}

// =============================================================================
// Tests
// =============================================================================
