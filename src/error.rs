//! Error type for the fallible edges of the crate (files, images, scenes)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid scene description: {0}")]
    Config(#[from] ron::error::SpannedError),

    #[error("unsupported framebuffer size {width}x{height}")]
    Dimensions { width: usize, height: usize },
}

pub type Result<T> = std::result::Result<T, RasterError>;
