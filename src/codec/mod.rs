//! Codec capability.
//!
//! Thin layer over the `image`, `png`, `gif` and `color_quant` crates that
//! the rest of the crate relies on:
//!
//! - [`decode`]: encoded bytes to bitmap, format sniffed from content
//! - [`encode`]: bitmap to bytes for a named format, with palette
//!   quantization and JPEG quality applied from [`ImageConfig`](crate::ImageConfig)
//! - [`paste`]: masked paste of one bitmap onto another
//! - [`quantize`]: RGB bitmap to an [`IndexedImage`]
//! - [`OutputFormat`] / [`ResampleFilter`]: recognized format and filter names

mod encoder;
mod format;
mod paste;
mod quantize;

pub use encoder::{
    clamp_quality, decode, encode, is_valid_quality, to_indexed, ALPHA_THRESHOLD,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY, TRANSPARENT_INDEX,
};
pub use format::{filter_format, OutputFormat, ResampleFilter};
pub use paste::paste;
pub use quantize::{quantize, IndexedImage};
