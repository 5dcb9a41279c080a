use std::path::Path;

use crate::model::ImageSpec;

use super::{IoError, Result};

/// A file format backend: recognizes files and opens them for reading.
pub trait ImageFormat: Send + Sync {
    fn name(&self) -> &'static str;

    fn extensions(&self) -> &'static [&'static str];

    fn supports_extension(&self, extension: &str) -> bool {
        self.extensions().contains(&extension)
    }

    /// Checks the leading bytes of a file for this format's signature.
    fn matches_signature(&self, header: &[u8]) -> bool;

    /// Opens `path` and reads its header. Pixel data is not touched.
    fn open(&self, path: &Path) -> Result<Box<dyn ImageInput>>;
}

/// An open image file positioned on one subimage.
///
/// Scanline `y` of slice `z` is written into `buf` as interleaved native-endian
/// samples; `buf` must hold at least `spec().scanline_bytes()` bytes.
pub trait ImageInput {
    fn format_name(&self) -> &'static str;

    fn spec(&self) -> &ImageSpec;

    fn subimage_count(&self) -> usize {
        1
    }

    fn current_subimage(&self) -> usize {
        0
    }

    fn seek_subimage(&mut self, index: usize) -> Result<()>;

    fn read_scanline(&mut self, y: usize, z: usize, buf: &mut [u8]) -> Result<()>;

    /// Reads the tile whose origin is `(x, y, z)`. The tile buffer is laid out
    /// `tile_depth x tile_height x tile_width` and zero-filled past the image
    /// edge.
    fn read_tile(&mut self, x: usize, y: usize, z: usize, buf: &mut [u8]) -> Result<()> {
        let spec = self.spec().clone();
        if !spec.is_tiled() {
            return Err(IoError::UnsupportedLayout(
                "tile read requested on an untiled image".into(),
            ));
        }
        let pixel_bytes = spec.pixel_bytes();
        let tile_depth = spec.tile_depth.max(1);
        let tile_row_bytes = spec.tile_width * pixel_bytes;
        let tile_bytes = tile_row_bytes * spec.tile_height * tile_depth;
        if buf.len() < tile_bytes {
            return Err(IoError::UnsupportedLayout(format!(
                "tile buffer holds {} bytes, {tile_bytes} required",
                buf.len()
            )));
        }
        buf[..tile_bytes].fill(0);

        let columns = spec.tile_width.min(spec.width.saturating_sub(x));
        let mut row = vec![0_u8; spec.scanline_bytes()];
        for tz in 0..tile_depth.min(spec.depth.saturating_sub(z)) {
            for ty in 0..spec.tile_height.min(spec.height.saturating_sub(y)) {
                self.read_scanline(y + ty, z + tz, &mut row)?;
                let source = &row[x * pixel_bytes..(x + columns) * pixel_bytes];
                let offset = (tz * spec.tile_height + ty) * tile_row_bytes;
                buf[offset..offset + source.len()].copy_from_slice(source);
            }
        }
        Ok(())
    }

    fn close(&mut self) {}
}
