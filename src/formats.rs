mod api;
mod codec;
mod error;
mod raster;
mod tiff;
mod util;

#[cfg(test)]
pub(crate) mod synthetic;

pub use api::{FormatRegistry, default_registry};
pub use codec::{ImageFormat, ImageInput};
pub use error::{IoError, Result};
pub use raster::RasterFormat;
pub use self::tiff::TiffFormat;
