use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::debug;

use super::raster::RasterFormat;
use super::tiff::TiffFormat;
use super::util::{extension, read_signature};
use super::{ImageFormat, ImageInput, IoError, Result};

/// Ordered set of format backends. Lookup tries the file extension first and
/// falls back to sniffing the file signature.
#[derive(Clone)]
pub struct FormatRegistry {
    formats: Vec<Arc<dyn ImageFormat>>,
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FormatRegistry")
            .field(
                "formats",
                &self.formats.iter().map(|format| format.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(RasterFormat);
        registry.register(TiffFormat);
        registry
    }
}

impl FormatRegistry {
    pub fn empty() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Adds a backend. Later registrations win over earlier ones for shared
    /// extensions and signatures.
    pub fn register<F: ImageFormat + 'static>(&mut self, format: F) {
        self.formats.insert(0, Arc::new(format));
    }

    pub fn format_names(&self) -> Vec<&'static str> {
        self.formats.iter().map(|format| format.name()).collect()
    }

    pub fn supported_extensions(&self) -> Vec<&'static str> {
        let mut extensions = self
            .formats
            .iter()
            .flat_map(|format| format.extensions().iter().copied())
            .collect::<Vec<_>>();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }

    pub fn find_by_extension(&self, extension: &str) -> Option<&dyn ImageFormat> {
        self.formats
            .iter()
            .find(|format| format.supports_extension(extension))
            .map(|format| format.as_ref())
    }

    pub fn find_by_signature(&self, header: &[u8]) -> Option<&dyn ImageFormat> {
        self.formats
            .iter()
            .find(|format| format.matches_signature(header))
            .map(|format| format.as_ref())
    }

    pub fn open(&self, path: impl AsRef<Path>) -> Result<Box<dyn ImageInput>> {
        let path = path.as_ref();
        if let Some(format) = extension(path)
            .as_deref()
            .and_then(|extension| self.find_by_extension(extension))
        {
            debug!("opening {} as {}", path.display(), format.name());
            return format.open(path);
        }
        let header = read_signature(path)?;
        let format = self
            .find_by_signature(&header)
            .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
        debug!("opening {} as {} (by signature)", path.display(), format.name());
        format.open(path)
    }
}

pub fn default_registry() -> Arc<FormatRegistry> {
    static REGISTRY: OnceLock<Arc<FormatRegistry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| Arc::new(FormatRegistry::default())))
}
