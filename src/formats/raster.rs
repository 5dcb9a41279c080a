use std::path::{Path, PathBuf};

use image::{ColorType, ImageDecoder, ImageReader};
use log::debug;

use crate::model::{AttributeValue, ImageSpec, Linearity, PixelFormat};

use super::util::copy_scanline;
use super::{ImageFormat, ImageInput, IoError, Result};

/// Single-frame raster formats decoded through the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterFormat;

impl ImageFormat for RasterFormat {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[
            "png", "jpg", "jpeg", "bmp", "gif", "tga", "webp", "pnm", "pbm", "pgm", "ppm", "hdr",
            "exr", "qoi", "ico",
        ]
    }

    fn matches_signature(&self, header: &[u8]) -> bool {
        image::guess_format(header).is_ok()
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ImageInput>> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
        let mut decoder = reader.into_decoder()?;
        let (width, height) = decoder.dimensions();
        let (nchannels, pixel_format) = layout_for(decoder.color_type())?;

        let mut spec = ImageSpec::new(width as usize, height as usize, nchannels, pixel_format);
        spec.linearity = match pixel_format {
            PixelFormat::F32 => Linearity::Linear,
            PixelFormat::U8 | PixelFormat::U16 => Linearity::Srgb,
        };
        if let Some(extension) = format.extensions_str().first() {
            spec.set_attribute("format", AttributeValue::String((*extension).to_string()));
        }
        if let Some(profile) = decoder.icc_profile()? {
            spec.set_attribute("ICCProfile", AttributeValue::UInt(profile.len() as u32));
        }
        spec.validate()?;
        debug!("raster header {}: {width}x{height}, {nchannels} channel", path.display());

        Ok(Box::new(RasterInput {
            path: path.to_path_buf(),
            spec,
            frame: None,
        }))
    }
}

fn layout_for(color: ColorType) -> Result<(usize, PixelFormat)> {
    let layout = match color {
        ColorType::L8 => (1, PixelFormat::U8),
        ColorType::La8 => (2, PixelFormat::U8),
        ColorType::Rgb8 => (3, PixelFormat::U8),
        ColorType::Rgba8 => (4, PixelFormat::U8),
        ColorType::L16 => (1, PixelFormat::U16),
        ColorType::La16 => (2, PixelFormat::U16),
        ColorType::Rgb16 => (3, PixelFormat::U16),
        ColorType::Rgba16 => (4, PixelFormat::U16),
        ColorType::Rgb32F => (3, PixelFormat::F32),
        ColorType::Rgba32F => (4, PixelFormat::F32),
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported raster color type: {other:?}"
            )));
        }
    };
    Ok(layout)
}

struct RasterInput {
    path: PathBuf,
    spec: ImageSpec,
    frame: Option<Vec<u8>>,
}

impl RasterInput {
    fn load_frame(&mut self) -> Result<()> {
        if self.frame.is_none() {
            let image = ImageReader::open(&self.path)?
                .with_guessed_format()?
                .decode()?;
            let bytes = image.as_bytes().to_vec();
            if bytes.len() as u64 != self.spec.image_bytes() {
                return Err(IoError::UnsupportedLayout(format!(
                    "decoded {} bytes but header promised {}",
                    bytes.len(),
                    self.spec.image_bytes()
                )));
            }
            self.frame = Some(bytes);
        }
        Ok(())
    }
}

impl ImageInput for RasterInput {
    fn format_name(&self) -> &'static str {
        "raster"
    }

    fn spec(&self) -> &ImageSpec {
        &self.spec
    }

    fn seek_subimage(&mut self, index: usize) -> Result<()> {
        if index == 0 {
            Ok(())
        } else {
            Err(IoError::OutOfRange {
                what: "subimage",
                index,
                count: 1,
            })
        }
    }

    fn read_scanline(&mut self, y: usize, z: usize, buf: &mut [u8]) -> Result<()> {
        self.load_frame()?;
        let frame = self.frame.as_deref().unwrap_or_default();
        copy_scanline(&self.spec, frame, y, z, buf)
    }

    fn close(&mut self) {
        self.frame = None;
    }
}
