use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
use tracing::debug;

use super::color::parse_color;
use crate::codec;
use crate::config::{ImageConfig, DEFAULT_BGCOLOR, DEFAULT_FORMAT};
use crate::error::RasterError;
use crate::source::ImageSource;

// =============================================================================
// Layer Input
// =============================================================================

/// Input accepted by [`LayerMerger::add`]: a source, nothing, or a nested
/// group of either.
#[derive(Debug)]
pub enum Layer {
    Source(ImageSource),
    Group(Vec<Layer>),
    Empty,
}

impl Layer {
    /// Append every source in traversal order, skipping empties.
    fn flatten_into(self, out: &mut Vec<ImageSource>) {
        match self {
            Layer::Source(source) => out.push(source),
            Layer::Group(layers) => {
                for layer in layers {
                    layer.flatten_into(out);
                }
            }
            Layer::Empty => {}
        }
    }
}

impl From<ImageSource> for Layer {
    fn from(source: ImageSource) -> Self {
        Layer::Source(source)
    }
}

impl<T: Into<Layer>> From<Option<T>> for Layer {
    fn from(layer: Option<T>) -> Self {
        layer.map_or(Layer::Empty, Into::into)
    }
}

impl<T: Into<Layer>> From<Vec<T>> for Layer {
    fn from(layers: Vec<T>) -> Self {
        Layer::Group(layers.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Merge Options
// =============================================================================

/// Parameters of [`LayerMerger::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Format tag of the merged result.
    pub format: String,
    /// Output size; `None` takes the first layer's size.
    pub size: Option<(u32, u32)>,
    /// Background color, parsed with [`parse_color`].
    pub bgcolor: String,
    /// Produce an RGBA result with a transparent background.
    pub transparent: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            size: None,
            bgcolor: DEFAULT_BGCOLOR.to_string(),
            transparent: false,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn size(mut self, size: (u32, u32)) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bgcolor(mut self, bgcolor: impl Into<String>) -> Self {
        self.bgcolor = bgcolor.into();
        self
    }

    pub fn transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }
}

// =============================================================================
// Layer Merger
// =============================================================================

/// Merges image sources into one, bottom layer first.
///
/// # Example
///
/// ```
/// use image::{DynamicImage, Rgb, RgbImage};
/// use raster_compose::{ImageSource, LayerMerger, MergeOptions};
///
/// let bottom = ImageSource::from_image(
///     DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))),
///     "png",
/// );
/// let top = ImageSource::from_image(
///     DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9]))),
///     "png",
/// );
///
/// let mut merger = LayerMerger::new();
/// merger.add(vec![Some(bottom), None, Some(top)]);
/// assert_eq!(merger.len(), 2);
///
/// let mut merged = merger.merge(&MergeOptions::new()).unwrap();
/// assert_eq!(merged.as_image().unwrap().to_rgb8().get_pixel(0, 0), &Rgb([9, 9, 9]));
/// ```
#[derive(Debug, Default)]
pub struct LayerMerger {
    layers: Vec<ImageSource>,
    config: ImageConfig,
}

impl LayerMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merger whose results encode with `config`.
    pub fn with_config(config: ImageConfig) -> Self {
        Self {
            layers: Vec::new(),
            config,
        }
    }

    /// Add one or more layers on top of the current ones. Nested groups are
    /// flattened, empty entries dropped.
    pub fn add(&mut self, layer: impl Into<Layer>) -> &mut Self {
        layer.into().flatten_into(&mut self.layers);
        self
    }

    pub fn layers(&self) -> &[ImageSource] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Merge all layers into a single source.
    ///
    /// A single layer whose transparency already matches is returned as it
    /// is, without decoding. Otherwise every layer is decoded and pasted onto
    /// a background canvas; layers with alpha blend through their own alpha.
    ///
    /// # Errors
    ///
    /// - [`RasterError::NoLayers`] without layers and without a size
    /// - [`RasterError::InvalidColor`] for a malformed `bgcolor`
    /// - decode errors of any layer
    pub fn merge(self, options: &MergeOptions) -> Result<ImageSource, RasterError> {
        let LayerMerger { mut layers, config } = self;

        if layers.len() == 1 && layers[0].is_transparent() == options.transparent {
            debug!("single layer, returning it unchanged");
            if let Some(layer) = layers.pop() {
                return Ok(layer);
            }
        }

        let (width, height) = match options.size {
            Some(size) => size,
            None => {
                let first = layers.first_mut().ok_or(RasterError::NoLayers)?;
                match first.size() {
                    Some(size) => size,
                    None => {
                        let image = first.as_image()?;
                        (image.width(), image.height())
                    }
                }
            }
        };

        let [r, g, b] = parse_color(&options.bgcolor)?;
        let mut canvas = if options.transparent {
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 0])))
        } else {
            DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([r, g, b])))
        };

        debug!(
            layers = layers.len(),
            width,
            height,
            transparent = options.transparent,
            "merging layers"
        );
        for layer in layers.iter_mut() {
            codec::paste(&mut canvas, layer.as_image()?);
        }

        Ok(ImageSource::from_image(canvas, options.format.clone())
            .with_transparent(options.transparent)
            .with_config(config))
    }
}

/// Merge `images` (bottom first) into one source.
///
/// Same as building a [`LayerMerger`] and calling
/// [`merge`](LayerMerger::merge); [`merge_options`] gives the usual
/// defaults for this call, which request a transparent result.
pub fn merge_images(
    images: Vec<ImageSource>,
    options: &MergeOptions,
) -> Result<ImageSource, RasterError> {
    let mut merger = LayerMerger::new();
    merger.add(images);
    merger.merge(options)
}

/// Default options for [`merge_images`]: png, transparent background.
pub fn merge_options() -> MergeOptions {
    MergeOptions::new().transparent(true)
}
