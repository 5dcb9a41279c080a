use serde::{Deserialize, Serialize};

/// Which part of the stored pixel the viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelView {
    #[default]
    FullColor,
    /// A single channel replicated as gray.
    Channel(usize),
    /// Weighted RGB sum shown as gray.
    Luminance,
}

impl ChannelView {
    /// Cycles `FullColor -> Channel(0) -> .. -> Channel(n - 1) -> Luminance -> FullColor`.
    pub fn next(self, nchannels: usize) -> Self {
        match self {
            Self::FullColor if nchannels > 0 => Self::Channel(0),
            Self::FullColor => Self::Luminance,
            Self::Channel(index) if index + 1 < nchannels => Self::Channel(index + 1),
            Self::Channel(_) => Self::Luminance,
            Self::Luminance => Self::FullColor,
        }
    }

    pub fn prev(self, nchannels: usize) -> Self {
        match self {
            Self::FullColor => Self::Luminance,
            Self::Luminance if nchannels > 0 => Self::Channel(nchannels - 1),
            Self::Luminance => Self::FullColor,
            Self::Channel(index) => match index.min(nchannels) {
                0 => Self::FullColor,
                clamped => Self::Channel(clamped - 1),
            },
        }
    }

    pub fn label(self, channel_names: &[String]) -> String {
        match self {
            Self::FullColor => "full color".to_string(),
            Self::Luminance => "luminance".to_string(),
            Self::Channel(index) => channel_names
                .get(index)
                .cloned()
                .unwrap_or_else(|| format!("channel{index}")),
        }
    }
}
