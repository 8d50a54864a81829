use std::fmt;
use std::str::FromStr;

use image::imageops::FilterType;
use image::ImageFormat;

use crate::error::RasterError;

/// Normalize a format name: lowercase, `geotiff` becomes `tiff` and every
/// `png*` variant (`png8`, `png24`, ...) becomes `png`.
pub fn filter_format(format: &str) -> String {
    let format = format.to_ascii_lowercase();
    if format == "geotiff" {
        return "tiff".to_string();
    }
    if format.starts_with("png") {
        return "png".to_string();
    }
    format
}

/// Output formats the encoder can serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Gif,
    Tiff,
}

impl OutputFormat {
    /// Resolve a format name, applying [`filter_format`] aliases first.
    pub fn from_name(name: &str) -> Result<Self, RasterError> {
        match filter_format(name).as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "gif" => Ok(OutputFormat::Gif),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            _ => Err(RasterError::UnsupportedFormat(name.to_string())),
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Tiff => "image/tiff",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Gif => ImageFormat::Gif,
            OutputFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

/// Resample filters exposed to callers that resize tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleFilter {
    Nearest,
    Bilinear,
    Bicubic,
}

impl ResampleFilter {
    /// All filters with their configuration names.
    pub const ALL: [(&'static str, ResampleFilter); 3] = [
        ("nearest", ResampleFilter::Nearest),
        ("bilinear", ResampleFilter::Bilinear),
        ("bicubic", ResampleFilter::Bicubic),
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Bilinear => "bilinear",
            ResampleFilter::Bicubic => "bicubic",
        }
    }

    /// The `image` crate filter implementing this resampling.
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Bilinear => FilterType::Triangle,
            ResampleFilter::Bicubic => FilterType::CatmullRom,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, filter)| *filter)
            .ok_or_else(|| format!("unknown resample filter: {}", s))
    }
}
