use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::model::ImageSpec;

use super::{IoError, Result};

pub(crate) const SIGNATURE_BYTES: usize = 16;

pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
}

pub(crate) fn read_signature(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut header = vec![0_u8; SIGNATURE_BYTES];
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    header.truncate(filled);
    Ok(header)
}

/// Copies row `y` of slice `z` out of a fully decoded, tightly packed frame.
pub(crate) fn copy_scanline(
    spec: &ImageSpec,
    frame: &[u8],
    y: usize,
    z: usize,
    buf: &mut [u8],
) -> Result<()> {
    if y >= spec.height {
        return Err(IoError::OutOfRange {
            what: "scanline",
            index: y,
            count: spec.height,
        });
    }
    if z >= spec.depth {
        return Err(IoError::OutOfRange {
            what: "slice",
            index: z,
            count: spec.depth,
        });
    }
    let row_bytes = spec.scanline_bytes();
    if buf.len() < row_bytes {
        return Err(IoError::UnsupportedLayout(format!(
            "scanline buffer holds {} bytes, {row_bytes} required",
            buf.len()
        )));
    }
    let start = (z * spec.height + y) * row_bytes;
    let source = frame.get(start..start + row_bytes).ok_or_else(|| {
        IoError::UnsupportedLayout(format!(
            "decoded frame holds {} bytes, expected {}",
            frame.len(),
            spec.image_bytes()
        ))
    })?;
    buf[..row_bytes].copy_from_slice(source);
    Ok(())
}

pub(crate) fn samples_to_ne_bytes<T: Copy, const N: usize>(
    samples: &[T],
    to_bytes: impl Fn(T) -> [u8; N],
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * N);
    for sample in samples {
        bytes.extend_from_slice(&to_bytes(*sample));
    }
    bytes
}
