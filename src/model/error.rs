use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid image size {width} x {height} x {depth}")]
    ZeroSizedImage {
        width: usize,
        height: usize,
        depth: usize,
    },

    #[error("image must have at least one channel")]
    NoChannels,

    #[error("channel name count mismatch: {nchannels} channels but {names} names")]
    ChannelNameMismatch { nchannels: usize, names: usize },

    #[error("invalid image spec: {0}")]
    InvalidSpec(String),
}
