use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not open \"{path}\" : {message}")]
    OpenFailed { path: String, message: String },

    #[error("could not read \"{path}\" : {message}")]
    ReadFailed { path: String, message: String },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("\"{path}\" could not be opened earlier; reload it to retry")]
    Broken { path: String },

    #[error("reading \"{path}\" was cancelled")]
    Cancelled { path: String },

    #[error("display transform failure: {0}")]
    Core(#[from] CoreError),
}

impl StoreError {
    pub(crate) fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::InvalidState(format!(
            "image index {index} out of range ({count} images)"
        ))
    }
}
