use std::fmt;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, warn};

use crate::codec;
use crate::config::ImageConfig;
use crate::error::RasterError;
use crate::io::ReadBuffer;

// =============================================================================
// Source Representation
// =============================================================================

/// The one representation an [`ImageSource`] currently holds.
pub enum Source {
    /// Decoded pixels
    Bitmap(DynamicImage),
    /// Encoded bytes, possibly still streaming
    Buffer(ReadBuffer),
    /// Encoded file on disk
    File(PathBuf),
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bitmap(image) => f
                .debug_struct("Bitmap")
                .field("dimensions", &image.dimensions())
                .field("color", &image.color())
                .finish(),
            Source::Buffer(buffer) => f.debug_tuple("Buffer").field(buffer).finish(),
            Source::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

impl From<DynamicImage> for Source {
    fn from(image: DynamicImage) -> Self {
        Source::Bitmap(image)
    }
}

impl From<ReadBuffer> for Source {
    fn from(buffer: ReadBuffer) -> Self {
        Source::Buffer(buffer)
    }
}

impl From<Bytes> for Source {
    fn from(data: Bytes) -> Self {
        Source::Buffer(ReadBuffer::from_bytes(data))
    }
}

impl From<Vec<u8>> for Source {
    fn from(data: Vec<u8>) -> Self {
        Source::Buffer(ReadBuffer::from_bytes(data))
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::File(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::File(path.to_path_buf())
    }
}

// =============================================================================
// Buffer Options
// =============================================================================

/// Options for [`ImageSource::as_buffer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferOptions {
    /// Wanted format. `None` keeps the declared format.
    pub format: Option<String>,
    /// Palette override for encoding; `None` uses the source's config.
    pub paletted: Option<bool>,
    /// Buffer the stream fully so it supports seeking.
    pub seekable: bool,
}

impl BufferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn paletted(mut self, paletted: bool) -> Self {
        self.paletted = Some(paletted);
        self
    }

    pub fn seekable(mut self) -> Self {
        self.seekable = true;
        self
    }
}

// =============================================================================
// Image Source
// =============================================================================

/// A raster image that is resolved lazily.
///
/// Holds exactly one [`Source`] plus metadata. Conversions happen on
/// demand:
///
/// - [`as_image`](Self::as_image) decodes once and caches the bitmap.
/// - [`as_buffer`](Self::as_buffer) encodes a bitmap, passes existing
///   bytes through untouched, or re-encodes them when a different format is
///   requested. A conversion replaces the representation for good.
///
/// Conversions mutate the source, so each in-flight tile needs its own
/// instance.
///
/// # Example
///
/// ```
/// use image::{DynamicImage, RgbImage};
/// use raster_compose::{BufferOptions, ImageSource};
///
/// let mut source = ImageSource::from_image(DynamicImage::ImageRgb8(RgbImage::new(8, 8)), "png");
/// assert_eq!(source.size(), Some((8, 8)));
///
/// let jpeg = source.to_bytes(&BufferOptions::new().format("jpeg")).unwrap();
/// assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
/// assert_eq!(source.format(), "jpeg");
/// ```
pub struct ImageSource {
    source: Source,
    /// Bitmap decoded from (or encoded into) a Buffer/File source
    decoded: Option<DynamicImage>,
    /// Stream handed out by `as_buffer` for a File source
    file_stream: Option<ReadBuffer>,
    format: String,
    transparent: bool,
    size: Option<(u32, u32)>,
    config: ImageConfig,
}

impl ImageSource {
    /// Create a source with a declared `format`.
    pub fn new(source: impl Into<Source>, format: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            decoded: None,
            file_stream: None,
            format: format.into(),
            transparent: false,
            size: None,
            config: ImageConfig::default(),
        }
    }

    pub fn from_image(image: DynamicImage, format: impl Into<String>) -> Self {
        Self::new(Source::Bitmap(image), format)
    }

    pub fn from_bytes(data: impl Into<Bytes>, format: impl Into<String>) -> Self {
        Self::new(Source::Buffer(ReadBuffer::from_bytes(data)), format)
    }

    /// Wrap a forward-only reader. It is buffered only once something needs
    /// to seek.
    pub fn from_reader<R: Read + Send + 'static>(reader: R, format: impl Into<String>) -> Self {
        Self::new(Source::Buffer(ReadBuffer::new(reader)), format)
    }

    pub fn from_file(path: impl Into<PathBuf>, format: impl Into<String>) -> Self {
        Self::new(Source::File(path.into()), format)
    }

    /// Explicit size, used while the image is not decoded.
    pub fn with_size(mut self, size: (u32, u32)) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn with_config(mut self, config: ImageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Replace the representation. Cached decodes and open file streams of
    /// the previous representation are dropped.
    pub fn set_source(&mut self, source: impl Into<Source>) {
        self.source = source.into();
        self.decoded = None;
        self.file_stream = None;
    }

    /// Declared format of the current buffer or file.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn set_format(&mut self, format: impl Into<String>) {
        self.format = format.into();
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    pub fn config(&self) -> &ImageConfig {
        &self.config
    }

    /// Whether a decoded bitmap is available without decoding.
    pub fn has_image(&self) -> bool {
        matches!(self.source, Source::Bitmap(_)) || self.decoded.is_some()
    }

    /// Pixel dimensions of the bitmap if one is available, else the explicit
    /// size.
    pub fn size(&self) -> Option<(u32, u32)> {
        match (&self.source, &self.decoded) {
            (Source::Bitmap(image), _) | (_, Some(image)) => Some(image.dimensions()),
            _ => self.size,
        }
    }

    /// Path of a file-backed source.
    pub fn filename(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            _ => None,
        }
    }

    /// Return the decoded bitmap, decoding and caching it on first use.
    ///
    /// # Errors
    ///
    /// - [`RasterError::Io`] if the file cannot be read
    /// - [`RasterError::Decode`] if the bytes are not an image; nothing is
    ///   cached and any file opened for the attempt is closed
    pub fn as_image(&mut self) -> Result<&DynamicImage, RasterError> {
        match self.source {
            Source::Bitmap(ref image) => Ok(image),
            _ => match self.decoded {
                Some(ref image) => Ok(image),
                None => {
                    let image = load(&mut self.source)?;
                    Ok(self.decoded.insert(image))
                }
            },
        }
    }

    /// Return the encoded stream, positioned at the start.
    ///
    /// - Existing bytes in the declared format (or with no format requested)
    ///   are returned as they are. `seekable` forces full buffering of
    ///   forward-only readers; files seek in place.
    /// - A bitmap is encoded in the requested format (default: declared) and
    ///   the encoded buffer becomes the representation.
    /// - Existing bytes in another format are decoded and re-encoded; the
    ///   declared format follows the new encoding. An unknown target format
    ///   fails before anything is decoded.
    pub fn as_buffer(&mut self, options: &BufferOptions) -> Result<&mut ReadBuffer, RasterError> {
        let requested = options.format.as_deref();

        if !matches!(self.source, Source::Bitmap(_)) {
            if let Some(format) = requested.filter(|f| !f.eq_ignore_ascii_case(&self.format)) {
                codec::OutputFormat::from_name(format)?;
                debug!(from = %self.format, to = %format, "converting image");
                let image = match self.decoded.take() {
                    Some(image) => image,
                    None => load(&mut self.source)?,
                };
                self.set_source(Source::Bitmap(image));
                self.format = format.to_string();
            }
        }

        let format = requested
            .map(str::to_string)
            .unwrap_or_else(|| self.format.clone());
        self.stream(&format, options)
    }

    /// Encoded content as one contiguous buffer. See [`as_buffer`](Self::as_buffer).
    pub fn to_bytes(&mut self, options: &BufferOptions) -> Result<Bytes, RasterError> {
        let buffer = self.as_buffer(options)?;
        Ok(buffer.to_bytes()?)
    }

    fn stream(
        &mut self,
        format: &str,
        options: &BufferOptions,
    ) -> Result<&mut ReadBuffer, RasterError> {
        match self.source {
            Source::Bitmap(ref image) => {
                debug!(format = %format, "image -> buffer");
                let data = codec::encode(image, format, options.paletted, &self.config)?;
                let previous = std::mem::replace(
                    &mut self.source,
                    Source::Buffer(ReadBuffer::from_bytes(data)),
                );
                if let Source::Bitmap(image) = previous {
                    self.decoded = Some(image);
                }
                self.file_stream = None;
                self.format = format.to_string();
                self.stream(format, options)
            }
            Source::Buffer(ref mut buffer) => {
                rewind(buffer, options.seekable)?;
                Ok(buffer)
            }
            Source::File(ref path) => {
                let stream = match self.file_stream {
                    Some(ref mut stream) => stream,
                    None => {
                        debug!(path = %path.display(), "opening file");
                        self.file_stream.insert(ReadBuffer::open(path)?)
                    }
                };
                rewind(stream, options.seekable)?;
                Ok(stream)
            }
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSource")
            .field("source", &self.source)
            .field("decoded", &self.decoded.is_some())
            .field("format", &self.format)
            .field("transparent", &self.transparent)
            .field("size", &self.size())
            .finish()
    }
}

/// Decode whatever `source` holds. Streams opened here are closed on return.
fn load(source: &mut Source) -> Result<DynamicImage, RasterError> {
    let result = match source {
        Source::Bitmap(image) => return Ok(image.clone()),
        Source::Buffer(buffer) => {
            debug!("buffer -> image");
            let data = buffer.to_bytes()?;
            codec::decode(&data)
        }
        Source::File(path) => {
            debug!(path = %path.display(), "file -> image");
            let data = ReadBuffer::open(&*path)?.to_bytes()?;
            codec::decode(&data)
        }
    };
    if let Err(e) = &result {
        warn!(source = ?source, error = %e, "failed to decode image");
    }
    result
}

/// Position a stream at its start. Forward-only readers are only buffered
/// when `seekable` asks for it.
fn rewind(buffer: &mut ReadBuffer, seekable: bool) -> io::Result<()> {
    if seekable {
        buffer.make_seekable()?;
    }
    if buffer.is_seekable() {
        buffer.rewind()?;
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
