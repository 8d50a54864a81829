//! Image source integration tests.
//!
//! Tests verify:
//! - Bytes in the requested format pass through untouched
//! - Conversions between formats replace the representation
//! - File sources decode lazily and stream without buffering
//! - Undecodable data reports errors without caching anything

use std::io::Read;

use image::GenericImageView;

use raster_compose::{BufferOptions, ImageSource, RasterError, ReadBuffer, Source};

use super::test_utils::{
    consumed, gradient, is_jpeg, is_png, jpeg_bytes, png_bytes, solid_rgb, truecolor,
    CountingReader, Fixtures,
};

// =============================================================================
// Passthrough
// =============================================================================

#[test]
fn test_png_bytes_pass_through_unchanged() {
    let data = png_bytes(&gradient(32, 32));
    let mut source = ImageSource::from_bytes(data.clone(), "png");

    let out = source.to_bytes(&BufferOptions::new().format("png")).unwrap();
    assert_eq!(out, data);
    assert!(!source.has_image());
}

#[test]
fn test_format_comparison_ignores_case() {
    let data = png_bytes(&gradient(8, 8));
    let mut source = ImageSource::from_bytes(data.clone(), "PNG");

    let out = source.to_bytes(&BufferOptions::new().format("png")).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_no_format_requested_returns_declared_bytes() {
    let data = jpeg_bytes(&gradient(16, 16));
    let mut source = ImageSource::from_bytes(data.clone(), "jpeg");

    let out = source.to_bytes(&BufferOptions::new()).unwrap();
    assert_eq!(out, data);
    assert_eq!(source.format(), "jpeg");
}

// =============================================================================
// Conversion
// =============================================================================

#[test]
fn test_jpeg_to_png_conversion_is_durable() {
    let mut source = ImageSource::from_bytes(jpeg_bytes(&gradient(16, 16)), "jpeg")
        .with_config(truecolor());

    let png = source.to_bytes(&BufferOptions::new().format("png")).unwrap();
    assert!(is_png(&png));
    assert_eq!(source.format(), "png");

    // Asking again returns the same encoding without re-encoding
    let again = source.to_bytes(&BufferOptions::new().format("png")).unwrap();
    assert_eq!(again, png);
    assert!(matches!(source.source(), Source::Buffer(_)));
}

#[test]
fn test_bitmap_encodes_in_declared_format() {
    let mut source = ImageSource::from_image(gradient(16, 16), "jpeg");

    let data = source.to_bytes(&BufferOptions::new()).unwrap();
    assert!(is_jpeg(&data));
    // The bitmap stays available after encoding
    assert!(source.has_image());
    assert_eq!(source.size(), Some((16, 16)));
}

#[test]
fn test_round_trip_preserves_pixels() {
    let original = gradient(24, 12);
    let mut source = ImageSource::from_image(original.clone(), "png").with_config(truecolor());
    let data = source.to_bytes(&BufferOptions::new()).unwrap();

    let mut decoded = ImageSource::from_bytes(data, "png");
    let image = decoded.as_image().unwrap();
    assert_eq!(image.dimensions(), (24, 12));
    assert_eq!(image.to_rgb8(), original.to_rgb8());
}

#[test]
fn test_set_source_discards_cached_bitmap() {
    let mut source = ImageSource::from_bytes(png_bytes(&solid_rgb(4, 4, [1, 2, 3])), "png");
    source.as_image().unwrap();
    assert!(source.has_image());

    source.set_source(png_bytes(&solid_rgb(8, 8, [9, 9, 9])));
    assert!(!source.has_image());
    assert_eq!(source.as_image().unwrap().dimensions(), (8, 8));
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_file_source_decodes_lazily() {
    let fixtures = Fixtures::new();
    let path = fixtures.write("tile.png", &png_bytes(&solid_rgb(10, 6, [0, 200, 0])));

    let mut source = ImageSource::from_file(&path, "png");
    assert_eq!(source.filename(), Some(path.as_path()));
    assert!(!source.has_image());

    let image = source.as_image().unwrap();
    assert_eq!(image.dimensions(), (10, 6));
    assert!(source.has_image());
}

#[test]
fn test_file_source_streams_same_bytes() {
    let fixtures = Fixtures::new();
    let data = png_bytes(&gradient(20, 20));
    let path = fixtures.write("tile.png", &data);

    let mut source = ImageSource::from_file(&path, "png");
    let out = source.to_bytes(&BufferOptions::new().format("png")).unwrap();
    assert_eq!(out, data);
}

#[test]
fn test_file_stream_restarts_on_every_request() {
    let fixtures = Fixtures::new();
    let data = png_bytes(&gradient(20, 20));
    let path = fixtures.write("tile.png", &data);
    let mut source = ImageSource::from_file(&path, "png");

    let mut first = Vec::new();
    source
        .as_buffer(&BufferOptions::new())
        .unwrap()
        .read_to_end(&mut first)
        .unwrap();
    let mut second = Vec::new();
    source
        .as_buffer(&BufferOptions::new())
        .unwrap()
        .read_to_end(&mut second)
        .unwrap();

    assert_eq!(first, data);
    assert_eq!(second, data);
    assert_eq!(source.to_bytes(&BufferOptions::new()).unwrap(), data);
}

#[test]
fn test_missing_file_is_io_error() {
    let fixtures = Fixtures::new();
    let mut source = ImageSource::from_file(fixtures.path("absent.png"), "png");

    let err = source.as_image().unwrap_err();
    assert!(matches!(err, RasterError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    assert!(!source.has_image());
}

#[test]
fn test_file_converted_to_other_format_drops_filename() {
    let fixtures = Fixtures::new();
    let path = fixtures.write("tile.png", &png_bytes(&gradient(8, 8)));

    let mut source = ImageSource::from_file(&path, "png");
    let data = source.to_bytes(&BufferOptions::new().format("jpeg")).unwrap();
    assert!(is_jpeg(&data));
    assert_eq!(source.filename(), None);
    assert_eq!(source.format(), "jpeg");
}

// =============================================================================
// Streams and Errors
// =============================================================================

#[test]
fn test_streaming_reader_not_buffered_unless_seekable() {
    let data = png_bytes(&gradient(16, 16));
    let (reader, counter) = CountingReader::new(data.to_vec());
    let mut source = ImageSource::from_reader(reader, "png");

    let buffer = source.as_buffer(&BufferOptions::new()).unwrap();
    assert!(!buffer.is_buffered());
    assert_eq!(consumed(&counter), 0);

    let buffer = source.as_buffer(&BufferOptions::new().seekable()).unwrap();
    assert!(buffer.is_buffered());
    assert_eq!(consumed(&counter), data.len());
}

#[test]
fn test_garbage_bytes_fail_to_decode() {
    let mut source = ImageSource::new(ReadBuffer::from_bytes(&b"not an image"[..]), "png");

    let err = source.as_image().unwrap_err();
    assert!(matches!(err, RasterError::Decode { .. }));
    assert!(!source.has_image());

    // The bytes are still there to hand out as they are
    let out = source.to_bytes(&BufferOptions::new()).unwrap();
    assert_eq!(&out[..], b"not an image");
}

#[test]
fn test_explicit_size_reported_before_decoding() {
    let source = ImageSource::from_bytes(png_bytes(&gradient(4, 4)), "png").with_size((256, 256));
    assert_eq!(source.size(), Some((256, 256)));
}
