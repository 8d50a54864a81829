//! Layer compositing.
//!
//! # Components
//!
//! - [`LayerMerger`]: stacks [`ImageSource`](crate::ImageSource)s bottom to
//!   top and composites them onto a background canvas
//! - [`merge_images`]: one-call wrapper around [`LayerMerger`]
//! - [`parse_color`]: background color strings to RGB
//! - [`is_single_color_image`]: uniform-color detection for bitmaps and
//!   indexed images

mod color;
mod merger;
mod solid;

pub use color::parse_color;
pub use merger::{merge_images, merge_options, Layer, LayerMerger, MergeOptions};
pub use solid::{is_single_color_image, Color, SingleColor};
