use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use tiff::ColorType;
use tiff::decoder::ifd::Value;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

use crate::model::{AttributeValue, ImageSpec, Linearity, PixelFormat};

use super::util::{copy_scanline, samples_to_ne_bytes};
use super::{ImageFormat, ImageInput, IoError, Result};

const STRING_TAGS: [(Tag, &str); 6] = [
    (Tag::ImageDescription, "ImageDescription"),
    (Tag::Software, "Software"),
    (Tag::Artist, "Artist"),
    (Tag::DateTime, "DateTime"),
    (Tag::HostComputer, "HostComputer"),
    (Tag::Copyright, "Copyright"),
];

/// TIFF files, including multi-page files where every page is a subimage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TiffFormat;

impl ImageFormat for TiffFormat {
    fn name(&self) -> &'static str {
        "tiff"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["tif", "tiff"]
    }

    fn matches_signature(&self, header: &[u8]) -> bool {
        [b"II*\0", b"MM\0*", b"II+\0", b"MM\0+"]
            .iter()
            .any(|magic| header.starts_with(*magic))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ImageInput>> {
        Ok(Box::new(TiffInput::open(path)?))
    }
}

type TiffDecoder = Decoder<BufReader<File>>;

struct TiffInput {
    path: PathBuf,
    decoder: TiffDecoder,
    spec: ImageSpec,
    subimage: usize,
    subimage_count: usize,
    frame: Option<Vec<u8>>,
}

impl TiffInput {
    fn open(path: &Path) -> Result<Self> {
        let mut decoder = new_decoder(path)?;
        let spec = read_spec(&mut decoder)?;
        let subimage_count = count_subimages(path)?;
        debug!(
            "tiff header {}: {}x{}, {} subimage(s)",
            path.display(),
            spec.width,
            spec.height,
            subimage_count
        );
        Ok(Self {
            path: path.to_path_buf(),
            decoder,
            spec,
            subimage: 0,
            subimage_count,
            frame: None,
        })
    }

    fn load_frame(&mut self) -> Result<()> {
        if self.frame.is_some() {
            return Ok(());
        }
        let bytes = match self.decoder.read_image()? {
            DecodingResult::U8(samples) => samples,
            DecodingResult::U16(samples) => samples_to_ne_bytes(&samples, u16::to_ne_bytes),
            DecodingResult::F32(samples) => samples_to_ne_bytes(&samples, f32::to_ne_bytes),
            _ => {
                return Err(IoError::UnsupportedLayout(
                    "unsupported TIFF sample type".into(),
                ));
            }
        };
        if bytes.len() as u64 != self.spec.image_bytes() {
            return Err(IoError::UnsupportedLayout(format!(
                "decoded {} bytes but header promised {}",
                bytes.len(),
                self.spec.image_bytes()
            )));
        }
        self.frame = Some(bytes);
        Ok(())
    }
}

impl ImageInput for TiffInput {
    fn format_name(&self) -> &'static str {
        "tiff"
    }

    fn spec(&self) -> &ImageSpec {
        &self.spec
    }

    fn subimage_count(&self) -> usize {
        self.subimage_count
    }

    fn current_subimage(&self) -> usize {
        self.subimage
    }

    fn seek_subimage(&mut self, index: usize) -> Result<()> {
        if index >= self.subimage_count {
            return Err(IoError::OutOfRange {
                what: "subimage",
                index,
                count: self.subimage_count,
            });
        }
        if index == self.subimage {
            return Ok(());
        }
        if index < self.subimage {
            self.decoder = new_decoder(&self.path)?;
            self.subimage = 0;
        }
        while self.subimage < index {
            self.decoder.next_image()?;
            self.subimage += 1;
        }
        self.spec = read_spec(&mut self.decoder)?;
        self.frame = None;
        Ok(())
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

fn new_decoder(path: &Path) -> Result<TiffDecoder> {
    Ok(Decoder::new(BufReader::new(File::open(path)?))?)
}

fn count_subimages(path: &Path) -> Result<usize> {
    let mut decoder = new_decoder(path)?;
    let mut count = 1;
    while decoder.more_images() {
        decoder.next_image()?;
        count += 1;
    }
    Ok(count)
}

fn read_spec(decoder: &mut TiffDecoder) -> Result<ImageSpec> {
    let (width, height) = decoder.dimensions()?;
    let (nchannels, bits) = match decoder.colortype()? {
        ColorType::Gray(bits) => (1, bits),
        ColorType::GrayA(bits) => (2, bits),
        ColorType::RGB(bits) => (3, bits),
        ColorType::RGBA(bits) => (4, bits),
        other => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported TIFF color type: {other:?}"
            )));
        }
    };
    let sample_format = decoder
        .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)?
        .and_then(|values| values.first().copied())
        .unwrap_or(1);
    let format = match (bits, sample_format) {
        (8, 1) => PixelFormat::U8,
        (16, 1) => PixelFormat::U16,
        (32, 3) => PixelFormat::F32,
        (bits, sample_format) => {
            return Err(IoError::UnsupportedLayout(format!(
                "unsupported TIFF sample layout: {bits} bits, sample format {sample_format}"
            )));
        }
    };

    let mut spec = ImageSpec::new(width as usize, height as usize, nchannels, format);
    spec.linearity = match format {
        PixelFormat::F32 => Linearity::Linear,
        PixelFormat::U8 | PixelFormat::U16 => Linearity::Unknown,
    };
    if let (Some(tile_width), Some(tile_height)) = (
        tag_u32(decoder, Tag::TileWidth)?,
        tag_u32(decoder, Tag::TileLength)?,
    ) {
        spec.tile_width = tile_width as usize;
        spec.tile_height = tile_height as usize;
        spec.tile_depth = 1;
    }

    for (tag, name) in STRING_TAGS {
        if let Some(text) = decoder
            .find_tag(tag)?
            .and_then(|value| value.into_string().ok())
        {
            spec.set_attribute(name, AttributeValue::String(text));
        }
    }
    if let Some(compression) = tag_u32(decoder, Tag::Compression)? {
        spec.set_attribute("tiff:Compression", AttributeValue::UInt(compression));
    }
    for (tag, name) in [
        (Tag::XResolution, "XResolution"),
        (Tag::YResolution, "YResolution"),
    ] {
        if let Some(Value::Rational(numerator, denominator)) = decoder.find_tag(tag)? {
            if denominator != 0 {
                let resolution = numerator as f32 / denominator as f32;
                spec.set_attribute(name, AttributeValue::Float(resolution));
            }
        }
    }

    spec.validate()?;
    Ok(spec)
}

fn tag_u32(decoder: &mut TiffDecoder, tag: Tag) -> Result<Option<u32>> {
    Ok(decoder
        .find_tag(tag)?
        .and_then(|value| value.into_u32().ok()))
}
