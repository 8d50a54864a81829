//! Encoding integration tests.
//!
//! Tests verify:
//! - Image configuration and per-call overrides reach the encoder
//! - Paletted output reserves a transparent index for clear pixels
//! - Lossless re-encoding of decoded JPEG data
//! - Single-color detection after an encode/decode cycle

use image::GenericImageView;

use raster_compose::codec::{decode, TRANSPARENT_INDEX};
use raster_compose::{
    is_single_color_image, BufferOptions, Color, ImageConfig, ImageSource, LayerMerger,
    MergeOptions,
};

use super::test_utils::{
    gradient, half_transparent, is_gif, is_jpeg, jpeg_bytes, png_header, solid_rgb, truecolor,
};

// =============================================================================
// Palette Mode
// =============================================================================

#[test]
fn test_default_config_writes_paletted_png() {
    let mut source = ImageSource::from_image(solid_rgb(8, 8, [12, 34, 56]), "png");
    let data = source.to_bytes(&BufferOptions::new()).unwrap();

    let (color_type, palette, _) = png_header(&data);
    assert_eq!(color_type, png::ColorType::Indexed);
    assert!(palette.unwrap() <= 256);
}

#[test]
fn test_buffer_option_overrides_config() {
    let mut source = ImageSource::from_image(gradient(8, 8), "png");
    let data = source
        .to_bytes(&BufferOptions::new().paletted(false))
        .unwrap();

    let (color_type, palette, _) = png_header(&data);
    assert_eq!(color_type, png::ColorType::Rgb);
    assert!(palette.is_none());
}

#[test]
fn test_paletted_png_keeps_transparency() {
    let mut merged = LayerMerger::new()
        .merge(&MergeOptions::new().size((8, 8)).transparent(true))
        .unwrap();
    // Nothing was pasted, so every pixel is fully transparent
    let data = merged.to_bytes(&BufferOptions::new()).unwrap();

    let (color_type, _, has_trns) = png_header(&data);
    assert_eq!(color_type, png::ColorType::Indexed);
    assert!(has_trns);

    let image = decode(&data).unwrap();
    assert_eq!(
        is_single_color_image(&image).map(|c| matches!(c, Color::Rgba([_, _, _, 0]))),
        Some(true)
    );
}

#[test]
fn test_paletted_gif_marks_clear_pixels() {
    let mut source = ImageSource::from_image(half_transparent(4, 2), "gif");
    let data = source.to_bytes(&BufferOptions::new()).unwrap();
    assert!(is_gif(&data));

    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(std::io::Cursor::new(data.to_vec())).unwrap();
    let frame = decoder.read_next_frame().unwrap().unwrap();
    assert_eq!(frame.transparent, Some(TRANSPARENT_INDEX));
    assert_ne!(frame.buffer[0], TRANSPARENT_INDEX);
    assert_eq!(frame.buffer[3], TRANSPARENT_INDEX);
}

// =============================================================================
// Conversions
// =============================================================================

#[test]
fn test_jpeg_to_png_is_lossless_after_decode() {
    let jpeg = jpeg_bytes(&gradient(24, 24));
    let expected = decode(&jpeg).unwrap().to_rgb8();

    let mut source = ImageSource::from_bytes(jpeg, "jpeg").with_config(truecolor());
    let png = source.to_bytes(&BufferOptions::new().format("png")).unwrap();

    assert_eq!(decode(&png).unwrap().to_rgb8(), expected);
}

#[test]
fn test_jpeg_quality_from_config() {
    let image = gradient(64, 64);
    let low = ImageConfig {
        jpeg_quality: 10,
        ..ImageConfig::default()
    };
    let high = ImageConfig {
        jpeg_quality: 100,
        ..ImageConfig::default()
    };

    let small = ImageSource::from_image(image.clone(), "jpeg")
        .with_config(low)
        .to_bytes(&BufferOptions::new())
        .unwrap();
    let large = ImageSource::from_image(image, "jpeg")
        .with_config(high)
        .to_bytes(&BufferOptions::new())
        .unwrap();

    assert!(is_jpeg(&small) && is_jpeg(&large));
    assert!(small.len() < large.len());
}

#[test]
fn test_tiff_output_decodes_to_same_size() {
    let mut source = ImageSource::from_image(gradient(10, 5), "tiff");
    let data = source.to_bytes(&BufferOptions::new()).unwrap();

    assert_eq!(decode(&data).unwrap().dimensions(), (10, 5));
}

// =============================================================================
// Single Color
// =============================================================================

#[test]
fn test_solid_tile_detected_after_round_trip() {
    let mut source = ImageSource::from_image(solid_rgb(16, 16, [70, 80, 90]), "png");
    let data = source.to_bytes(&BufferOptions::new()).unwrap();

    let mut decoded = ImageSource::from_bytes(data, "png");
    assert_eq!(
        is_single_color_image(decoded.as_image().unwrap()),
        Some(Color::Rgb([70, 80, 90]))
    );
}

#[test]
fn test_gradient_is_not_single_color() {
    let mut source = ImageSource::from_image(gradient(16, 16), "png");
    assert_eq!(is_single_color_image(source.as_image().unwrap()), None);
}
