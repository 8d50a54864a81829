//! Lazily-resolved raster sources.
//!
//! An [`ImageSource`] wraps one tile in whichever form the producer had it:
//!
//! ```text
//!            as_image()                     as_buffer(format)
//!  File ──────────────┐             ┌──────────────────────────── Buffer
//!                     ▼             │                               ▲
//!  Buffer ───────▶ decoded bitmap ──┴── encode (format, paletted) ──┘
//!                     ▲
//!  Bitmap ────────────┘
//! ```
//!
//! Existing bytes are passed through when their declared format already
//! matches; otherwise they are decoded and re-encoded.

mod image_source;

pub use image_source::{BufferOptions, ImageSource, Source};
