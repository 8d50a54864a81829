//! Bitmap encoder.
//!
//! Turns a decoded bitmap into bytes of a named format.
//!
//! # Design Decisions
//!
//! - **Paletted PNG/GIF**: when palette mode is on, PNG and GIF output is
//!   quantized to an adaptive palette. Alpha is reduced to a binary mask:
//!   pixels with alpha at or below [`ALPHA_THRESHOLD`] map to the reserved
//!   [`TRANSPARENT_INDEX`], everything else is opaque.
//!
//! - **Format aliases**: `geotiff` is written as TIFF and every `png*`
//!   variant as PNG. Palette mode only triggers on the plain `png` and `gif`
//!   names.
//!
//! - **JPEG quality**: taken from [`ImageConfig`], clamped to 1-100. Alpha
//!   is dropped since JPEG has no alpha channel.

use std::borrow::Cow;
use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use tracing::debug;

use super::format::{filter_format, OutputFormat};
use super::quantize::{quantize, IndexedImage};
use crate::config::ImageConfig;
use crate::error::RasterError;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Palette entry reserved for transparent pixels in paletted output.
pub const TRANSPARENT_INDEX: u8 = 255;

/// Alpha values at or below this become fully transparent in paletted output.
pub const ALPHA_THRESHOLD: u8 = 128;

// =============================================================================
// Encoder
// =============================================================================

/// Encode `image` as `format`.
///
/// `paletted` overrides [`ImageConfig::paletted`] when given.
///
/// # Errors
///
/// - [`RasterError::UnsupportedFormat`] for unknown format names
/// - [`RasterError::Encode`] if the codec rejects the image
///
/// # Example
///
/// ```
/// use image::{DynamicImage, RgbImage};
/// use raster_compose::{codec::encode, ImageConfig};
///
/// let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
/// let png = encode(&img, "png", Some(false), &ImageConfig::default()).unwrap();
/// assert_eq!(&png[1..4], b"PNG");
/// ```
pub fn encode(
    image: &DynamicImage,
    format: &str,
    paletted: Option<bool>,
    config: &ImageConfig,
) -> Result<Bytes, RasterError> {
    let paletted = paletted.unwrap_or(config.paletted);
    let output = OutputFormat::from_name(format)?;
    let requested = format.to_ascii_lowercase();

    if paletted && (requested == "png" || requested == "gif") {
        let indexed = to_indexed(image);
        debug!(
            format = %output,
            colors = indexed.palette().len(),
            transparent = indexed.transparent_index().is_some(),
            "encoding paletted image"
        );
        return match output {
            OutputFormat::Gif => write_indexed_gif(&indexed),
            _ => write_indexed_png(&indexed),
        };
    }

    debug!(format = %output, normalized = %filter_format(format), "encoding image");
    match output {
        OutputFormat::Jpeg => write_jpeg(image, config.jpeg_quality),
        other => {
            let mut out = Cursor::new(Vec::new());
            image
                .write_to(&mut out, other.image_format())
                .map_err(RasterError::encode)?;
            Ok(Bytes::from(out.into_inner()))
        }
    }
}

/// Quantize for palette output, reserving [`TRANSPARENT_INDEX`] when the
/// image carries alpha.
pub fn to_indexed(image: &DynamicImage) -> IndexedImage {
    if !image.color().has_alpha() {
        return quantize(&image.to_rgb8(), 256);
    }

    let rgba = image.to_rgba8();
    let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        image::Rgb([p[0], p[1], p[2]])
    });

    let mut indexed = quantize(&rgb, 255);
    let alpha: Vec<u8> = rgba.pixels().map(|p| p[3]).collect();
    indexed.mask_transparent(TRANSPARENT_INDEX, |i| alpha[i] <= ALPHA_THRESHOLD);
    indexed
}

fn write_jpeg(image: &DynamicImage, quality: u8) -> Result<Bytes, RasterError> {
    let quality = clamp_quality(quality);
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

    let result = match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => encoder.encode_image(image),
        _ => encoder.encode_image(&image.to_rgb8()),
    };
    result.map_err(RasterError::encode)?;

    Ok(Bytes::from(output))
}

fn write_indexed_png(indexed: &IndexedImage) -> Result<Bytes, RasterError> {
    let (width, height) = indexed.dimensions();
    let mut output = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut output, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        // png has no run-length mode; Fast is its cheapest deflate setting
        encoder.set_compression(png::Compression::Fast);
        encoder.set_palette(indexed.palette_bytes());
        if let Some(index) = indexed.transparent_index() {
            let mut trns = vec![255u8; index as usize + 1];
            trns[index as usize] = 0;
            encoder.set_trns(trns);
        }

        let mut writer = encoder.write_header().map_err(RasterError::encode)?;
        writer
            .write_image_data(indexed.indices())
            .map_err(RasterError::encode)?;
        writer.finish().map_err(RasterError::encode)?;
    }
    Ok(Bytes::from(output))
}

fn write_indexed_gif(indexed: &IndexedImage) -> Result<Bytes, RasterError> {
    let (width, height) = indexed.dimensions();
    let too_large = || RasterError::Encode {
        message: format!(
            "image dimensions {}x{} exceed GIF maximum (65535x65535)",
            width, height
        ),
    };
    let width = u16::try_from(width).map_err(|_| too_large())?;
    let height = u16::try_from(height).map_err(|_| too_large())?;

    let palette = indexed.palette_bytes();
    let mut output = Vec::new();
    {
        let mut encoder =
            gif::Encoder::new(&mut output, width, height, &palette).map_err(RasterError::encode)?;
        let frame = gif::Frame {
            width,
            height,
            buffer: Cow::Borrowed(indexed.indices()),
            transparent: indexed.transparent_index(),
            ..Default::default()
        };
        encoder.write_frame(&frame).map_err(RasterError::encode)?;
    }
    Ok(Bytes::from(output))
}

/// Decode encoded bytes, sniffing the format from the content.
pub fn decode(data: &[u8]) -> Result<DynamicImage, RasterError> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .decode()
        .map_err(RasterError::decode)
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
///
/// Values below 1 become 1, values above 100 become 100.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
