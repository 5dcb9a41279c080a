use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported image layout for this format: {0}")]
    UnsupportedLayout(String),

    #[error("{what} {index} out of range (count {count})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        count: usize,
    },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image decode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF decode failure: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("invalid image spec: {0}")]
    Core(#[from] CoreError),
}
