//! Palette quantization.
//!
//! Two strategies, tried in order:
//!
//! - **Exact**: when the image has no more distinct colors than the palette
//!   allows, the palette is the set of colors itself. Single pass, lossless.
//! - **Adaptive**: otherwise NeuQuant builds an adaptive palette over an
//!   opaque RGB intermediate.

use std::collections::HashMap;

use color_quant::NeuQuant;
use image::{Rgb, RgbImage};

/// NeuQuant sampling factor (1 = every pixel, 30 = fastest).
const NEUQUANT_SAMPLE_FACTOR: i32 = 10;

/// An indexed-color image: one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    palette: Vec<[u8; 3]>,
    indices: Vec<u8>,
    transparent_index: Option<u8>,
}

impl IndexedImage {
    /// Build an indexed image. `indices` must hold `width * height` entries.
    pub fn new(width: u32, height: u32, palette: Vec<[u8; 3]>, indices: Vec<u8>) -> Self {
        debug_assert_eq!(indices.len(), width as usize * height as usize);
        Self {
            width,
            height,
            palette,
            indices,
            transparent_index: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn palette(&self) -> &[[u8; 3]] {
        &self.palette
    }

    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Palette entry rendered fully transparent, if any.
    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent_index
    }

    /// Color of a palette index. Indices past the palette resolve to black,
    /// matching how decoders treat short palettes.
    pub fn color_of(&self, index: u8) -> [u8; 3] {
        self.palette
            .get(index as usize)
            .copied()
            .unwrap_or([0, 0, 0])
    }

    /// Palette as flat `RGBRGB...` bytes, the layout PNG and GIF expect.
    pub fn palette_bytes(&self) -> Vec<u8> {
        self.palette.iter().flatten().copied().collect()
    }

    /// Reserve `index` as the transparent entry and force it on every pixel
    /// where `is_clear` holds. The palette is padded so the index exists.
    pub fn mask_transparent<F>(&mut self, index: u8, mut is_clear: F)
    where
        F: FnMut(usize) -> bool,
    {
        let needed = index as usize + 1;
        if self.palette.len() < needed {
            self.palette.resize(needed, [0, 0, 0]);
        }
        for (i, px) in self.indices.iter_mut().enumerate() {
            if is_clear(i) {
                *px = index;
            }
        }
        self.transparent_index = Some(index);
    }
}

/// Quantize an RGB image to at most `colors` palette entries (1..=256).
pub fn quantize(image: &RgbImage, colors: usize) -> IndexedImage {
    let colors = colors.clamp(1, 256);
    exact_palette(image, colors).unwrap_or_else(|| neuquant(image, colors))
}

/// Palette of the image's own colors, or `None` if there are too many.
fn exact_palette(image: &RgbImage, colors: usize) -> Option<IndexedImage> {
    let mut lookup: HashMap<[u8; 3], u8> = HashMap::new();
    let mut palette = Vec::new();
    let mut indices = Vec::with_capacity(image.as_raw().len() / 3);

    for Rgb(rgb) in image.pixels() {
        let index = match lookup.get(rgb) {
            Some(&index) => index,
            None => {
                if palette.len() == colors {
                    return None;
                }
                let index = palette.len() as u8;
                palette.push(*rgb);
                lookup.insert(*rgb, index);
                index
            }
        };
        indices.push(index);
    }

    Some(IndexedImage::new(
        image.width(),
        image.height(),
        palette,
        indices,
    ))
}

fn neuquant(image: &RgbImage, colors: usize) -> IndexedImage {
    let rgba: Vec<u8> = image
        .pixels()
        .flat_map(|Rgb([r, g, b])| [*r, *g, *b, 255])
        .collect();

    let nq = NeuQuant::new(NEUQUANT_SAMPLE_FACTOR, colors, &rgba);

    let palette: Vec<[u8; 3]> = nq
        .color_map_rgb()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();

    let indices: Vec<u8> = rgba
        .chunks_exact(4)
        .map(|px| nq.index_of(px) as u8)
        .collect();

    IndexedImage::new(image.width(), image.height(), palette, indices)
}
