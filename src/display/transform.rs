use image::{Rgba, RgbaImage};
use ndarray::Array3;
use rayon::prelude::*;

use crate::model::{CoreError, ImageSpec, Linearity, Result};

use super::{ChannelView, DisplaySettings};

/// Rec. 709 luma weights.
pub const LUMINANCE_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Gray+alpha keeps alpha second, RGBA fourth.
fn alpha_channel(nchannels: usize) -> Option<usize> {
    match nchannels {
        2 => Some(1),
        n if n >= 4 => Some(3),
        _ => None,
    }
}

pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(value: f32) -> f32 {
    if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * value.powf(1.0 / 2.4) - 0.055
    }
}

fn decode(linearity: Linearity, value: f32) -> f32 {
    match linearity {
        Linearity::Srgb => srgb_to_linear(value),
        Linearity::GammaCorrected(gamma) if gamma > 0.0 => value.max(0.0).powf(gamma),
        _ => value,
    }
}

fn encode(linearity: Linearity, value: f32) -> f32 {
    match linearity {
        Linearity::Srgb => linear_to_srgb(value),
        Linearity::GammaCorrected(gamma) if gamma > 0.0 => value.powf(1.0 / gamma),
        _ => value,
    }
}

pub fn quantize_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Maps stored samples to display intensities in `0..=1`.
///
/// Samples are decoded to linear light according to the image's
/// [`Linearity`], reduced by the channel view, scaled by `2^exposure`,
/// clamped, re-encoded, and finally raised to `1 / gamma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayTransform {
    pub mode: ChannelView,
    pub exposure: f32,
    pub gamma: f32,
    pub linearity: Linearity,
}

impl Default for DisplayTransform {
    fn default() -> Self {
        Self::new(ChannelView::FullColor, DisplaySettings::default(), Linearity::Unknown)
    }
}

impl DisplayTransform {
    pub fn new(mode: ChannelView, settings: DisplaySettings, linearity: Linearity) -> Self {
        Self {
            mode,
            exposure: settings.exposure(),
            gamma: settings.gamma(),
            linearity,
        }
    }

    pub fn output_channels(&self, nchannels: usize) -> usize {
        match self.mode {
            ChannelView::FullColor => nchannels,
            ChannelView::Channel(_) | ChannelView::Luminance => 1,
        }
    }

    fn finish(&self, linear: f32, gain: f32) -> f32 {
        let encoded = encode(self.linearity, (linear * gain).clamp(0.0, 1.0));
        if (self.gamma - 1.0).abs() > f32::EPSILON && self.gamma > 0.0 {
            encoded.powf(1.0 / self.gamma)
        } else {
            encoded
        }
    }

    /// Transforms one pixel. `out` must hold [`Self::output_channels`] values.
    pub fn apply(&self, pixel: &[f32], out: &mut [f32]) {
        let gain = self.exposure.exp2();
        match self.mode {
            ChannelView::FullColor => {
                let alpha = alpha_channel(pixel.len());
                for (index, (target, value)) in out.iter_mut().zip(pixel).enumerate() {
                    *target = if Some(index) == alpha {
                        value.clamp(0.0, 1.0)
                    } else {
                        self.finish(decode(self.linearity, *value), gain)
                    };
                }
            }
            ChannelView::Channel(index) => {
                let value = pixel.get(index).copied().unwrap_or(0.0);
                out[0] = self.finish(decode(self.linearity, value), gain);
            }
            ChannelView::Luminance => {
                let luminance = if pixel.len() >= 3 {
                    LUMINANCE_WEIGHTS
                        .iter()
                        .zip(pixel)
                        .map(|(weight, value)| weight * decode(self.linearity, *value))
                        .sum::<f32>()
                } else {
                    decode(self.linearity, pixel.first().copied().unwrap_or(0.0))
                };
                out[0] = self.finish(luminance, gain);
            }
        }
    }

    /// Transforms one stored scanline into `width * output_channels` values.
    pub fn apply_scanline(&self, spec: &ImageSpec, scanline: &[u8], out: &mut [f32]) {
        let sample_bytes = spec.format.size();
        let out_channels = self.output_channels(spec.nchannels);
        let mut pixel = vec![0.0_f32; spec.nchannels];
        for (source, target) in scanline
            .chunks_exact(spec.pixel_bytes())
            .zip(out.chunks_exact_mut(out_channels))
        {
            for (value, bytes) in pixel.iter_mut().zip(source.chunks_exact(sample_bytes)) {
                *value = spec.format.sample_to_f32(bytes);
            }
            self.apply(&pixel, target);
        }
    }

    /// Transforms a whole resident image into `[rows, width, channels]`, where
    /// rows run over every slice of a volume.
    pub fn render(&self, spec: &ImageSpec, pixels: &[u8]) -> Result<Array3<f32>> {
        spec.validate()?;
        if pixels.len() as u64 != spec.image_bytes() {
            return Err(CoreError::InvalidSpec(format!(
                "pixel buffer holds {} bytes, spec requires {}",
                pixels.len(),
                spec.image_bytes()
            )));
        }
        let rows = spec.total_scanlines();
        let out_channels = self.output_channels(spec.nchannels);
        let mut values = vec![0.0_f32; rows * spec.width * out_channels];
        values
            .par_chunks_mut(spec.width * out_channels)
            .zip(pixels.par_chunks(spec.scanline_bytes()))
            .for_each(|(out, scanline)| self.apply_scanline(spec, scanline, out));
        Array3::from_shape_vec((rows, spec.width, out_channels), values)
            .map_err(|error| CoreError::InvalidSpec(error.to_string()))
    }
}

/// Packs rendered display values into an RGBA8 image. Gray values are
/// replicated; a missing alpha is opaque.
pub fn to_rgba8(values: &Array3<f32>) -> RgbaImage {
    let (rows, width, channels) = values.dim();
    RgbaImage::from_fn(width as u32, rows as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let at = |channel: usize| quantize_u8(values[[y, x, channel]]);
        match channels {
            0 => Rgba([0, 0, 0, 255]),
            1 => {
                let gray = at(0);
                Rgba([gray, gray, gray, 255])
            }
            2 => {
                let gray = at(0);
                Rgba([gray, gray, gray, at(1)])
            }
            3 => Rgba([at(0), at(1), at(2), 255]),
            _ => Rgba([at(0), at(1), at(2), at(3)]),
        }
    })
}

/// Shrinks `image` to fit within `max_size` on its longer side, keeping the
/// aspect ratio. Images that already fit are copied unchanged.
pub fn thumbnail(image: &RgbaImage, max_size: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    let longest = width.max(height);
    if max_size == 0 || longest <= max_size {
        return image.clone();
    }
    let scale = max_size as f32 / longest as f32;
    let target_width = ((width as f32 * scale).round() as u32).max(1);
    let target_height = ((height as f32 * scale).round() as u32).max(1);
    image::imageops::thumbnail(image, target_width, target_height)
}
