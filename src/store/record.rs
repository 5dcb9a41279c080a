use std::mem;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::display::{ChannelView, DisplaySettings, DisplayTransform};
use crate::model::{ImageSpec, Linearity};

/// Header information that stays valid while a record knows its spec.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecHeader {
    pub spec: ImageSpec,
    pub current_subimage: usize,
    pub subimage_count: usize,
}

#[derive(Debug, Default)]
enum Residency {
    #[default]
    Ignorant,
    SpecKnown(SpecHeader),
    PixelsResident {
        header: SpecHeader,
        pixels: Vec<u8>,
    },
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidencyState {
    /// Only the name is known; no I/O has happened.
    Ignorant,
    SpecKnown,
    PixelsResident,
    /// The file could not be opened. Stays this way until a forced reload.
    Broken,
}

/// Per-file state: what is resident, the last error, and display settings.
#[derive(Debug)]
pub struct ImageRecord {
    name: String,
    path: PathBuf,
    residency: Residency,
    thumbnail: Option<RgbaImage>,
    last_error: Option<String>,
    display: DisplaySettings,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.to_string_lossy().to_string(),
            path,
            residency: Residency::Ignorant,
            thumbnail: None,
            last_error: None,
            display: DisplaySettings::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ResidencyState {
        match self.residency {
            Residency::Ignorant => ResidencyState::Ignorant,
            Residency::SpecKnown(_) => ResidencyState::SpecKnown,
            Residency::PixelsResident { .. } => ResidencyState::PixelsResident,
            Residency::Broken => ResidencyState::Broken,
        }
    }

    pub fn is_spec_valid(&self) -> bool {
        self.header().is_some()
    }

    pub fn is_pixels_valid(&self) -> bool {
        matches!(self.residency, Residency::PixelsResident { .. })
    }

    pub fn is_thumbnail_valid(&self) -> bool {
        self.thumbnail.is_some()
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.residency, Residency::Broken)
    }

    pub fn header(&self) -> Option<&SpecHeader> {
        match &self.residency {
            Residency::SpecKnown(header) | Residency::PixelsResident { header, .. } => Some(header),
            Residency::Ignorant | Residency::Broken => None,
        }
    }

    pub fn spec(&self) -> Option<&ImageSpec> {
        self.header().map(|header| &header.spec)
    }

    pub fn current_subimage(&self) -> Option<usize> {
        self.header().map(|header| header.current_subimage)
    }

    pub fn subimage_count(&self) -> Option<usize> {
        self.header().map(|header| header.subimage_count)
    }

    pub fn pixels(&self) -> Option<&[u8]> {
        match &self.residency {
            Residency::PixelsResident { pixels, .. } => Some(pixels),
            _ => None,
        }
    }

    pub fn thumbnail(&self) -> Option<&RgbaImage> {
        self.thumbnail.as_ref()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    /// Returns the last error message and clears it.
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn display(&self) -> DisplaySettings {
        self.display
    }

    /// Mutable display settings. The cached thumbnail was rendered with the
    /// old settings, so it is dropped.
    pub fn display_mut(&mut self) -> &mut DisplaySettings {
        self.thumbnail = None;
        &mut self.display
    }

    pub fn gamma(&self) -> f32 {
        self.display.gamma()
    }

    pub fn set_gamma(&mut self, gamma: f32) {
        self.display_mut().set_gamma(gamma);
    }

    pub fn exposure(&self) -> f32 {
        self.display.exposure()
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.display_mut().set_exposure(exposure);
    }

    pub fn display_transform(&self, mode: ChannelView) -> DisplayTransform {
        let linearity = self
            .spec()
            .map(|spec| spec.linearity)
            .unwrap_or(Linearity::Unknown);
        DisplayTransform::new(mode, self.display, linearity)
    }

    pub(super) fn set_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub(super) fn mark_spec_known(&mut self, header: SpecHeader) {
        self.residency = Residency::SpecKnown(header);
        self.thumbnail = None;
    }

    pub(super) fn mark_broken(&mut self, message: impl Into<String>) {
        self.residency = Residency::Broken;
        self.thumbnail = None;
        self.set_error(message);
    }

    /// Installs a freshly read pixel buffer. Returns false (and drops the
    /// buffer) when no spec is known.
    pub(super) fn mark_pixels_resident(&mut self, pixels: Vec<u8>) -> bool {
        match mem::take(&mut self.residency) {
            Residency::SpecKnown(header) | Residency::PixelsResident { header, .. } => {
                self.residency = Residency::PixelsResident { header, pixels };
                true
            }
            other => {
                self.residency = other;
                false
            }
        }
    }

    /// Frees pixels and thumbnail but keeps the spec.
    pub(super) fn drop_pixels(&mut self) {
        self.residency = match mem::take(&mut self.residency) {
            Residency::PixelsResident { header, .. } => Residency::SpecKnown(header),
            other => other,
        };
        self.thumbnail = None;
    }

    /// Discards everything known about the file, including a broken mark.
    pub(super) fn forget(&mut self) {
        self.residency = Residency::Ignorant;
        self.thumbnail = None;
    }

    pub(super) fn set_thumbnail(&mut self, thumbnail: RgbaImage) {
        self.thumbnail = Some(thumbnail);
    }
}
