use image::{DynamicImage, ImageBuffer, Pixel};
use serde::Serialize;

use crate::codec::IndexedImage;

/// A single pixel value as reported by [`is_single_color_image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Color {
    Luma(u8),
    LumaA([u8; 2]),
    Rgb([u8; 3]),
    Rgba([u8; 4]),
}

/// Images that can report whether all their pixels share one color.
pub trait SingleColor {
    /// The only color present, or `None` if there are several (or none).
    fn single_color(&self) -> Option<Color>;
}

impl SingleColor for DynamicImage {
    fn single_color(&self) -> Option<Color> {
        match self {
            DynamicImage::ImageLuma8(img) => uniform(img).map(|p| Color::Luma(p.0[0])),
            DynamicImage::ImageLumaA8(img) => uniform(img).map(|p| Color::LumaA(p.0)),
            DynamicImage::ImageRgb8(img) => uniform(img).map(|p| Color::Rgb(p.0)),
            DynamicImage::ImageRgba8(img) => uniform(img).map(|p| Color::Rgba(p.0)),
            other => uniform(&other.to_rgba8()).map(|p| Color::Rgba(p.0)),
        }
    }
}

impl SingleColor for IndexedImage {
    fn single_color(&self) -> Option<Color> {
        let (&first, rest) = self.indices().split_first()?;
        if rest.iter().any(|&i| i != first) {
            return None;
        }
        Some(Color::Rgb(self.color_of(first)))
    }
}

/// Check whether `image` contains exactly one color and return it.
///
/// Indexed images resolve the palette entry to RGB; other images report the
/// raw pixel value.
pub fn is_single_color_image<I: SingleColor + ?Sized>(image: &I) -> Option<Color> {
    image.single_color()
}

fn uniform<P, C>(img: &ImageBuffer<P, C>) -> Option<P>
where
    P: Pixel + PartialEq,
    C: std::ops::Deref<Target = [P::Subpixel]>,
{
    let mut pixels = img.pixels();
    let first = *pixels.next()?;
    pixels.all(|p| *p == first).then_some(first)
}
