//! In-memory format backend for tests: deterministic pixels, counted opens,
//! and failures on demand.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::model::{ImageSpec, PixelFormat};

use super::{ImageFormat, ImageInput, IoError, Result};

pub(crate) const EXTENSION: &str = "syn";

#[derive(Debug, Clone)]
pub(crate) struct SyntheticFile {
    pub(crate) subimages: Vec<ImageSpec>,
    pub(crate) fail_open: bool,
    pub(crate) fail_read_at: Option<usize>,
}

impl SyntheticFile {
    pub(crate) fn new(spec: ImageSpec) -> Self {
        Self {
            subimages: vec![spec],
            fail_open: false,
            fail_read_at: None,
        }
    }

    pub(crate) fn failing_read_at(mut self, row: usize) -> Self {
        self.fail_read_at = Some(row);
        self
    }

    pub(crate) fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub(crate) fn with_subimage(mut self, spec: ImageSpec) -> Self {
        self.subimages.push(spec);
        self
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    opens: AtomicUsize,
    scanlines: AtomicUsize,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SyntheticFormat {
    files: HashMap<String, SyntheticFile>,
    counters: Arc<Counters>,
}

impl SyntheticFormat {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `name` (e.g. `"a.syn"`), matched on the file name of the path.
    pub(crate) fn with_file(mut self, name: &str, file: SyntheticFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }

    pub(crate) fn opens(&self) -> usize {
        self.counters.opens.load(Ordering::SeqCst)
    }

    pub(crate) fn scanlines_read(&self) -> usize {
        self.counters.scanlines.load(Ordering::SeqCst)
    }
}

/// Sample value written for channel `c` of pixel `(x, y, z)`.
pub(crate) fn sample_value(x: usize, y: usize, z: usize, c: usize) -> u8 {
    ((x + 2 * y + 3 * c + 5 * z) % 256) as u8
}

fn encode_sample(format: PixelFormat, value: u8, out: &mut Vec<u8>) {
    match format {
        PixelFormat::U8 => out.push(value),
        PixelFormat::U16 => out.extend_from_slice(&(u16::from(value) * 257).to_ne_bytes()),
        PixelFormat::F32 => out.extend_from_slice(&(f32::from(value) / 255.0).to_ne_bytes()),
    }
}

impl ImageFormat for SyntheticFormat {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[EXTENSION]
    }

    fn matches_signature(&self, _header: &[u8]) -> bool {
        false
    }

    fn open(&self, path: &Path) -> Result<Box<dyn ImageInput>> {
        self.counters.opens.fetch_add(1, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = self.files.get(&name).ok_or_else(|| {
            IoError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {name}"),
            ))
        })?;
        if file.fail_open {
            return Err(IoError::UnsupportedFormat(format!("corrupt header in {name}")));
        }
        Ok(Box::new(SyntheticInput {
            file: file.clone(),
            subimage: 0,
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct SyntheticInput {
    file: SyntheticFile,
    subimage: usize,
    counters: Arc<Counters>,
}

impl ImageInput for SyntheticInput {
    fn format_name(&self) -> &'static str {
        "synthetic"
    }

    fn spec(&self) -> &ImageSpec {
        &self.file.subimages[self.subimage]
    }

    fn subimage_count(&self) -> usize {
        self.file.subimages.len()
    }

    fn current_subimage(&self) -> usize {
        self.subimage
    }

    fn seek_subimage(&mut self, index: usize) -> Result<()> {
        if index >= self.file.subimages.len() {
            return Err(IoError::OutOfRange {
                what: "subimage",
                index,
                count: self.file.subimages.len(),
            });
        }
        self.subimage = index;
        Ok(())
    }

    fn read_scanline(&mut self, y: usize, z: usize, buf: &mut [u8]) -> Result<()> {
        self.counters.scanlines.fetch_add(1, Ordering::SeqCst);
        if self.file.fail_read_at == Some(y) {
            return Err(IoError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("truncated data at scanline {y}"),
            )));
        }
        let spec = self.spec();
        let mut row = Vec::with_capacity(spec.scanline_bytes());
        for x in 0..spec.width {
            for c in 0..spec.nchannels {
                encode_sample(spec.format, sample_value(x, y, z, c), &mut row);
            }
        }
        buf[..row.len()].copy_from_slice(&row);
        Ok(())
    }
}
