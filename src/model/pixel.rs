use serde::{Deserialize, Serialize};

/// Storage type of a single channel sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PixelFormat {
    #[default]
    U8,
    U16,
    F32,
}

impl PixelFormat {
    pub fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::F32 => 4,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            Self::U8 => "uint8",
            Self::U16 => "uint16",
            Self::F32 => "float",
        }
    }

    /// Reads one native-endian sample and normalizes integer formats to `0..=1`.
    pub fn sample_to_f32(self, bytes: &[u8]) -> f32 {
        match self {
            Self::U8 => f32::from(bytes[0]) / 255.0,
            Self::U16 => f32::from(u16::from_ne_bytes([bytes[0], bytes[1]])) / 65_535.0,
            Self::F32 => f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
        }
    }
}

/// How stored values relate to linear light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Linearity {
    #[default]
    Unknown,
    Linear,
    GammaCorrected(f32),
    Srgb,
}

pub fn default_channel_names(nchannels: usize) -> Vec<String> {
    let named: &[&str] = match nchannels {
        1 => &["Y"],
        2 => &["Y", "A"],
        3 => &["R", "G", "B"],
        _ => &["R", "G", "B", "A"],
    };
    (0..nchannels)
        .map(|index| {
            named
                .get(index)
                .map(|name| (*name).to_string())
                .unwrap_or_else(|| format!("channel{index}"))
        })
        .collect()
}
