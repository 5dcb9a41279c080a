use serde::{Deserialize, Serialize};

use super::{
    Attribute, AttributeValue, CoreError, Linearity, PixelFormat, Result, default_channel_names,
};

/// Structural description of one (sub)image: data window, channels, sample
/// format, color encoding and free-form attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub full_width: usize,
    pub full_height: usize,
    pub full_depth: usize,
    pub tile_width: usize,
    pub tile_height: usize,
    pub tile_depth: usize,
    pub nchannels: usize,
    pub channel_names: Vec<String>,
    pub format: PixelFormat,
    pub linearity: Linearity,
    pub attributes: Vec<Attribute>,
}

impl Default for ImageSpec {
    fn default() -> Self {
        Self::new(0, 0, 0, PixelFormat::U8)
    }
}

impl ImageSpec {
    /// A flat, untiled 2D spec whose full size matches the data window.
    pub fn new(width: usize, height: usize, nchannels: usize, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            depth: 1,
            x: 0,
            y: 0,
            z: 0,
            full_width: width,
            full_height: height,
            full_depth: 1,
            tile_width: 0,
            tile_height: 0,
            tile_depth: 0,
            nchannels,
            channel_names: default_channel_names(nchannels),
            format,
            linearity: Linearity::Unknown,
            attributes: Vec::new(),
        }
    }

    pub fn pixel_bytes(&self) -> usize {
        self.nchannels * self.format.size()
    }

    pub fn scanline_bytes(&self) -> usize {
        self.width * self.pixel_bytes()
    }

    /// Rows across all slices of a volume.
    pub fn total_scanlines(&self) -> usize {
        self.height * self.depth.max(1)
    }

    pub fn image_bytes(&self) -> u64 {
        self.scanline_bytes() as u64 * self.total_scanlines() as u64
    }

    pub fn is_tiled(&self) -> bool {
        self.tile_width > 0 && self.tile_height > 0
    }

    pub fn is_volume(&self) -> bool {
        self.depth > 1
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| &attribute.value)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        let name = name.into();
        match self
            .attributes
            .iter_mut()
            .find(|attribute| attribute.name == name)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(CoreError::ZeroSizedImage {
                width: self.width,
                height: self.height,
                depth: self.depth,
            });
        }
        if self.nchannels == 0 {
            return Err(CoreError::NoChannels);
        }
        if self.channel_names.len() != self.nchannels {
            return Err(CoreError::ChannelNameMismatch {
                nchannels: self.nchannels,
                names: self.channel_names.len(),
            });
        }
        if self.is_tiled() && self.tile_depth == 0 && self.depth > 1 {
            return Err(CoreError::InvalidSpec(
                "tiled volumes need a non-zero tile depth".to_string(),
            ));
        }
        Ok(())
    }
}
