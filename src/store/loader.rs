use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, warn};
use ndarray::s;

use crate::display::{ChannelView, thumbnail, to_rgba8};
use crate::formats::{FormatRegistry, ImageInput, IoError, default_registry};
use crate::model::ImageSpec;

use super::{ImageRecord, Result, SpecHeader, StoreError};

/// Progress callback for pixel reads. Receives the completed fraction in
/// `0..=1`; returning `false` cancels the read.
pub type Progress<'a> = &'a mut dyn FnMut(f32) -> bool;

enum ReadFailure {
    Cancelled,
    Decode(IoError),
}

impl From<IoError> for ReadFailure {
    fn from(error: IoError) -> Self {
        Self::Decode(error)
    }
}

/// Ordered collection of image records sharing one format registry.
///
/// Every transition that touches a file goes through `&mut self`, so at most
/// one decode runs per store at a time.
#[derive(Debug)]
pub struct ImageStore {
    registry: Arc<FormatRegistry>,
    records: Vec<ImageRecord>,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl ImageStore {
    pub fn new(registry: Arc<FormatRegistry>) -> Self {
        Self {
            registry,
            records: Vec::new(),
        }
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ImageRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ImageRecord> {
        self.records.get_mut(index)
    }

    /// Appends a record for `path` and returns its index. With
    /// `load_spec_now`, the header is read immediately; a failure leaves the
    /// record broken with its error message set, but it is still added.
    pub fn register(&mut self, path: impl Into<PathBuf>, load_spec_now: bool) -> usize {
        let index = self.records.len();
        self.records.push(ImageRecord::new(path));
        if load_spec_now {
            let _ = self.ensure_spec(index);
        }
        index
    }

    /// Makes the header of the current subimage known. A no-op when the spec
    /// is already valid; fails without I/O when the record is broken.
    pub fn ensure_spec(&mut self, index: usize) -> Result<&ImageSpec> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, count))?;
        load_spec(&self.registry, record, 0)?;
        spec_of(record)
    }

    /// Makes the pixels of the current subimage resident. With `force`, any
    /// resident data is discarded and both header and pixels are read again,
    /// which also retries a broken record.
    ///
    /// A read failure or cancellation keeps the spec, frees any partial
    /// buffer, and records the error message.
    pub fn ensure_pixels(
        &mut self,
        index: usize,
        force: bool,
        mut progress: Option<Progress<'_>>,
    ) -> Result<()> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, count))?;
        if record.is_pixels_valid() && !force {
            return Ok(());
        }

        let subimage = record.current_subimage().unwrap_or(0);
        if force {
            record.forget();
        }
        load_spec(&self.registry, record, subimage)?;
        let spec = spec_of(record)?.clone();
        let subimage = record.current_subimage().unwrap_or(0);

        match read_pixels(&self.registry, record.path(), &spec, subimage, &mut progress) {
            Ok(pixels) => {
                if !record.mark_pixels_resident(pixels) {
                    return Err(StoreError::InvalidState(format!(
                        "\"{}\" lost its spec during the pixel read",
                        record.name()
                    )));
                }
                debug!(
                    "read {} bytes of pixels for {}",
                    spec.image_bytes(),
                    record.name()
                );
                Ok(())
            }
            Err(ReadFailure::Cancelled) => {
                warn!("pixel read of {} cancelled", record.name());
                record.set_error("pixel read cancelled");
                Err(StoreError::Cancelled {
                    path: record.name().to_string(),
                })
            }
            Err(ReadFailure::Decode(error)) => {
                let message = error.to_string();
                warn!("pixel read of {} failed: {message}", record.name());
                record.set_error(message.clone());
                Err(StoreError::ReadFailed {
                    path: record.name().to_string(),
                    message,
                })
            }
        }
    }

    /// Returns the last error of a record and clears it.
    pub fn take_error(&mut self, index: usize) -> Option<String> {
        self.records.get_mut(index).and_then(ImageRecord::take_error)
    }

    /// Borrowed view of row `y` of the resident pixels. For volumes, rows run
    /// over every slice, so `y < height * depth`.
    pub fn scanline(&self, index: usize, y: usize) -> Result<&[u8]> {
        let record = self
            .records
            .get(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, self.records.len()))?;
        let (Some(spec), Some(pixels)) = (record.spec(), record.pixels()) else {
            return Err(StoreError::InvalidState(format!(
                "pixels of \"{}\" are not resident",
                record.name()
            )));
        };
        let rows = spec.total_scanlines();
        if y >= rows {
            return Err(StoreError::InvalidState(format!(
                "scanline {y} out of range ({rows} rows)"
            )));
        }
        let row_bytes = spec.scanline_bytes();
        Ok(&pixels[y * row_bytes..(y + 1) * row_bytes])
    }

    /// Releases pixels and thumbnail. The spec stays known.
    pub fn close(&mut self, index: usize) -> Result<()> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, count))?;
        if record.is_pixels_valid() {
            debug!("releasing pixels of {}", record.name());
        }
        record.drop_pixels();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<ImageRecord> {
        if index >= self.records.len() {
            return Err(StoreError::index_out_of_range(index, self.records.len()));
        }
        Ok(self.records.remove(index))
    }

    /// Forgets everything resident and re-reads the header of the current
    /// subimage. Pixels are read again on the next [`Self::ensure_pixels`].
    pub fn reload(&mut self, index: usize) -> Result<&ImageSpec> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, count))?;
        let subimage = record.current_subimage().unwrap_or(0);
        record.forget();
        load_spec(&self.registry, record, subimage)?;
        spec_of(record)
    }

    /// Switches to another subimage. Resident pixels of the previous one are
    /// released; an out-of-range index leaves the record untouched.
    pub fn select_subimage(&mut self, index: usize, subimage: usize) -> Result<&ImageSpec> {
        let count = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or_else(|| StoreError::index_out_of_range(index, count))?;
        let subimages = match record.subimage_count() {
            Some(subimages) => subimages,
            None if record.is_broken() => {
                return Err(StoreError::Broken {
                    path: record.name().to_string(),
                });
            }
            // header read without committing it to the record
            None => match read_header(&self.registry, record.path(), 0) {
                Ok(header) => header.subimage_count,
                Err(error) => return Err(open_failed(record, error)),
            },
        };
        if subimage >= subimages {
            return Err(StoreError::InvalidState(format!(
                "subimage {subimage} out of range ({subimages} subimages)"
            )));
        }
        if record.current_subimage() != Some(subimage) {
            record.forget();
            load_spec(&self.registry, record, subimage)?;
        }
        spec_of(record)
    }

    /// Builds (or returns the cached) display thumbnail, reading pixels first
    /// when needed. Volumes show their first slice.
    pub fn ensure_thumbnail(&mut self, index: usize, max_size: u32) -> Result<&RgbaImage> {
        self.ensure_pixels(index, false, None)?;
        let record = &mut self.records[index];
        if !record.is_thumbnail_valid() {
            let image = {
                let (Some(spec), Some(pixels)) = (record.spec(), record.pixels()) else {
                    return Err(StoreError::InvalidState("pixels unavailable".into()));
                };
                let rendered = record
                    .display_transform(ChannelView::FullColor)
                    .render(spec, pixels)?;
                let first_slice = rendered.slice(s![0..spec.height, .., ..]).to_owned();
                thumbnail(&to_rgba8(&first_slice), max_size)
            };
            record.set_thumbnail(image);
        }
        record
            .thumbnail()
            .ok_or_else(|| StoreError::InvalidState("thumbnail unavailable".into()))
    }
}

fn spec_of(record: &ImageRecord) -> Result<&ImageSpec> {
    record
        .spec()
        .ok_or_else(|| StoreError::InvalidState(format!("spec of \"{}\" unknown", record.name())))
}

/// Reads the header of `subimage` unless a spec is already known. Broken
/// records fail without touching the file.
fn load_spec(registry: &FormatRegistry, record: &mut ImageRecord, subimage: usize) -> Result<()> {
    if record.is_spec_valid() {
        return Ok(());
    }
    if record.is_broken() {
        return Err(StoreError::Broken {
            path: record.name().to_string(),
        });
    }
    match read_header(registry, record.path(), subimage) {
        Ok(header) => {
            debug!(
                "{}: {}x{}x{} {} channel(s), subimage {}/{}",
                record.name(),
                header.spec.width,
                header.spec.height,
                header.spec.depth,
                header.spec.nchannels,
                header.current_subimage + 1,
                header.subimage_count
            );
            record.mark_spec_known(header);
            Ok(())
        }
        Err(error) => Err(open_failed(record, error)),
    }
}

fn open_failed(record: &mut ImageRecord, error: IoError) -> StoreError {
    let message = error.to_string();
    warn!("could not open {}: {message}", record.name());
    record.mark_broken(message.clone());
    StoreError::OpenFailed {
        path: record.name().to_string(),
        message,
    }
}

fn open_at(
    registry: &FormatRegistry,
    path: &Path,
    subimage: usize,
) -> crate::formats::Result<Box<dyn ImageInput>> {
    let mut input = registry.open(path)?;
    if input.current_subimage() != subimage {
        input.seek_subimage(subimage)?;
    }
    Ok(input)
}

fn read_header(
    registry: &FormatRegistry,
    path: &Path,
    subimage: usize,
) -> crate::formats::Result<SpecHeader> {
    let mut input = open_at(registry, path, subimage)?;
    let spec = input.spec().clone();
    spec.validate()?;
    let header = SpecHeader {
        spec,
        current_subimage: subimage,
        subimage_count: input.subimage_count(),
    };
    input.close();
    Ok(header)
}

fn same_layout(a: &ImageSpec, b: &ImageSpec) -> bool {
    a.width == b.width
        && a.height == b.height
        && a.depth == b.depth
        && a.nchannels == b.nchannels
        && a.format == b.format
}

fn report(progress: &mut Option<Progress<'_>>, done: usize, total: usize) -> bool {
    match progress {
        Some(callback) => callback(done as f32 / total.max(1) as f32),
        None => true,
    }
}

fn read_pixels(
    registry: &FormatRegistry,
    path: &Path,
    spec: &ImageSpec,
    subimage: usize,
    progress: &mut Option<Progress<'_>>,
) -> std::result::Result<Vec<u8>, ReadFailure> {
    let mut input = open_at(registry, path, subimage)?;
    if !same_layout(input.spec(), spec) {
        return Err(ReadFailure::Decode(IoError::UnsupportedLayout(
            "file layout changed since its header was read".into(),
        )));
    }
    let size = usize::try_from(spec.image_bytes()).map_err(|_| {
        IoError::UnsupportedLayout(format!("{} bytes exceed addressable memory", spec.image_bytes()))
    })?;
    let mut pixels = vec![0_u8; size];

    if spec.is_tiled() {
        read_tiles(input.as_mut(), spec, &mut pixels, progress)?;
    } else {
        let total = spec.total_scanlines();
        for (row, chunk) in pixels.chunks_exact_mut(spec.scanline_bytes()).enumerate() {
            input.read_scanline(row % spec.height, row / spec.height, chunk)?;
            if !report(progress, row + 1, total) {
                return Err(ReadFailure::Cancelled);
            }
        }
    }
    input.close();
    Ok(pixels)
}

fn read_tiles(
    input: &mut dyn ImageInput,
    spec: &ImageSpec,
    pixels: &mut [u8],
    progress: &mut Option<Progress<'_>>,
) -> std::result::Result<(), ReadFailure> {
    let pixel_bytes = spec.pixel_bytes();
    let row_bytes = spec.scanline_bytes();
    let tile_depth = spec.tile_depth.max(1);
    let tile_row_bytes = spec.tile_width * pixel_bytes;
    let mut tile = vec![0_u8; tile_row_bytes * spec.tile_height * tile_depth];

    let origins: Vec<(usize, usize, usize)> = (0..spec.depth)
        .step_by(tile_depth)
        .flat_map(|z| {
            (0..spec.height).step_by(spec.tile_height).flat_map(move |y| {
                (0..spec.width)
                    .step_by(spec.tile_width)
                    .map(move |x| (x, y, z))
            })
        })
        .collect();
    let total = origins.len();

    for (done, (x, y, z)) in origins.into_iter().enumerate() {
        input.read_tile(x, y, z, &mut tile)?;
        let copy_bytes = spec.tile_width.min(spec.width - x) * pixel_bytes;
        for tz in 0..tile_depth.min(spec.depth - z) {
            for ty in 0..spec.tile_height.min(spec.height - y) {
                let source = (tz * spec.tile_height + ty) * tile_row_bytes;
                let target = ((z + tz) * spec.height + y + ty) * row_bytes + x * pixel_bytes;
                pixels[target..target + copy_bytes]
                    .copy_from_slice(&tile[source..source + copy_bytes]);
            }
        }
        if !report(progress, done + 1, total) {
            return Err(ReadFailure::Cancelled);
        }
    }
    Ok(())
}
