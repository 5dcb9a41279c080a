use serde::{Deserialize, Serialize};

use crate::viewer::{MAX_MAGNIFICATION, MIN_MAGNIFICATION, ZOOM_STEP, ZoomLimits};

use super::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Factor applied per zoom in/out step.
    pub zoom_step: f32,
    pub min_magnification: f32,
    pub max_magnification: f32,
    /// Longer side of generated thumbnails, in pixels.
    pub thumbnail_size: u32,
    /// Read headers as soon as images are added.
    pub load_spec_on_add: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_step: ZOOM_STEP,
            min_magnification: MIN_MAGNIFICATION,
            max_magnification: MAX_MAGNIFICATION,
            thumbnail_size: 128,
            load_spec_on_add: true,
        }
    }
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        let (min, max) = (self.min_magnification, self.max_magnification);
        if !(min > 0.0 && min <= 1.0 && max >= 1.0 && max.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "magnification bounds must satisfy 0 < min <= 1 <= max, got [{min}, {max}]"
            )));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::Invalid(
                "thumbnail_size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            step: self.zoom_step,
            min_magnification: self.min_magnification,
            max_magnification: self.max_magnification,
        }
    }
}
