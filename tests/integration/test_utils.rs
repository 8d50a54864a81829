//! Test utilities for integration tests.
//!
//! Fixture bitmaps, their encoded forms and helpers to put them on disk.

use std::io::{self, Cursor, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

use raster_compose::ImageConfig;

// =============================================================================
// Bitmaps
// =============================================================================

/// Opaque RGB bitmap of a single color.
pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// RGBA bitmap of a single color.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

/// RGB gradient; every pixel differs from its neighbours.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    }))
}

/// RGBA bitmap, fully opaque red on the left half and fully transparent on
/// the right half.
pub fn half_transparent(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    }))
}

// =============================================================================
// Encoded Data
// =============================================================================

/// Encode with the `image` crate directly, bypassing the library.
pub fn encode_with_image(image: &DynamicImage, format: ImageFormat) -> Bytes {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    Bytes::from(out.into_inner())
}

pub fn png_bytes(image: &DynamicImage) -> Bytes {
    encode_with_image(image, ImageFormat::Png)
}

pub fn jpeg_bytes(image: &DynamicImage) -> Bytes {
    encode_with_image(&DynamicImage::ImageRgb8(image.to_rgb8()), ImageFormat::Jpeg)
}

pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, b'P', b'N', b'G'])
}

pub fn is_jpeg(data: &[u8]) -> bool {
    data.starts_with(&[0xFF, 0xD8])
}

pub fn is_gif(data: &[u8]) -> bool {
    data.starts_with(b"GIF8")
}

/// Configuration that keeps PNG output truecolor.
pub fn truecolor() -> ImageConfig {
    ImageConfig {
        paletted: false,
        ..ImageConfig::default()
    }
}

/// PNG color type and palette length (if any) from the header chunks.
pub fn png_header(data: &[u8]) -> (png::ColorType, Option<usize>, bool) {
    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::IDENTITY);
    let reader = decoder.read_info().unwrap();
    let info = reader.info();
    (
        info.color_type,
        info.palette.as_ref().map(|p| p.len() / 3),
        info.trns.is_some(),
    )
}

// =============================================================================
// Files
// =============================================================================

/// Temporary directory holding fixture files; removed on drop.
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Write `data` to `name` inside the fixture directory.
    pub fn write(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

// =============================================================================
// Readers
// =============================================================================

/// A forward-only reader that counts how many bytes were pulled from it.
pub struct CountingReader {
    inner: Cursor<Vec<u8>>,
    consumed: Arc<AtomicUsize>,
}

impl CountingReader {
    pub fn new(data: impl Into<Vec<u8>>) -> (Self, Arc<AtomicUsize>) {
        let consumed = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: Cursor::new(data.into()),
                consumed: consumed.clone(),
            },
            consumed,
        )
    }
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed.fetch_add(n, Ordering::SeqCst);
        Ok(n)
    }
}

pub fn consumed(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
