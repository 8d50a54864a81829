use thiserror::Error;

/// Errors raised while resolving, encoding or compositing raster sources.
#[derive(Debug, Error)]
pub enum RasterError {
    /// File open/read failure, surfaced as-is from the file system
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The codec could not interpret the bytes as an image
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// The codec failed to serialize the image
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Output format name is not one the encoder knows
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Background color string could not be parsed
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Merge needs at least one layer or an explicit size
    #[error("Cannot merge: no layers and no output size given")]
    NoLayers,
}

impl RasterError {
    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        RasterError::Decode {
            message: err.to_string(),
        }
    }

    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        RasterError::Encode {
            message: err.to_string(),
        }
    }
}
