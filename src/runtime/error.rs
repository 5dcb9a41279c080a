use crate::config::ConfigError;
use crate::formats::IoError;
use crate::model::CoreError;
use crate::store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("image spec error: {0}")]
    Core(#[from] CoreError),

    #[error("image I/O error: {0}")]
    Io(#[from] IoError),

    #[error("image store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
