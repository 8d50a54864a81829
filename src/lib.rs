//! # raster-compose
//!
//! Lazy raster tile sources, layer compositing and format-aware encoding.
//!
//! A tile service gets image data in several shapes: bytes fetched from a
//! cache or upstream server, files on disk, bitmaps it rendered itself. This
//! library unifies them behind [`ImageSource`], converts between them only
//! when something asks, and merges stacks of them into one output image.
//!
//! ## Features
//!
//! - **Lazy conversion**: sources decode on first pixel access and encode on
//!   first byte access, then keep the result
//! - **Passthrough**: bytes already in the wanted format are never re-encoded
//! - **Compositing**: layers are alpha-blended onto a background color
//! - **Paletted output**: PNG/GIF can be quantized to 256 colors with a
//!   reserved transparent index
//!
//! ## Architecture
//!
//! - [`io`] - [`ReadBuffer`], forward-only streams made seekable on demand
//! - [`source`] - [`ImageSource`] and its representations
//! - [`codec`] - decode, encode, quantize, paste
//! - [`merge`] - [`LayerMerger`], color parsing, single-color detection
//! - [`config`] - [`ImageConfig`] and the CLI arguments
//!
//! ## Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
//! use raster_compose::{BufferOptions, ImageSource, LayerMerger, MergeOptions};
//!
//! let base = ImageSource::from_image(
//!     DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 200, 200]))),
//!     "png",
//! );
//! let overlay = ImageSource::from_image(
//!     DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0]))),
//!     "png",
//! )
//! .with_transparent(true);
//!
//! let mut merger = LayerMerger::new();
//! merger.add(vec![base, overlay]);
//!
//! let mut merged = merger.merge(&MergeOptions::new().format("png")).unwrap();
//! let png = merged.to_bytes(&BufferOptions::new()).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod source;

// Re-export commonly used types
pub use codec::{encode, filter_format, IndexedImage, OutputFormat, ResampleFilter};
pub use config::ImageConfig;
pub use error::RasterError;
pub use io::ReadBuffer;
pub use merge::{
    is_single_color_image, merge_images, Color, Layer, LayerMerger, MergeOptions, SingleColor,
};
pub use source::{BufferOptions, ImageSource, Source};
