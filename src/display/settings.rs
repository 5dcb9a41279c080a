use serde::{Deserialize, Serialize};

pub const GAMMA_STEP: f32 = 0.05;
pub const MIN_GAMMA: f32 = 0.05;
pub const EXPOSURE_FINE_STEP: f32 = 0.1;
pub const EXPOSURE_COARSE_STEP: f32 = 0.5;

/// Per-image display controls. Exposure is in stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    gamma: f32,
    exposure: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            exposure: 0.0,
        }
    }
}

impl DisplaySettings {
    pub fn new(gamma: f32, exposure: f32) -> Self {
        let mut settings = Self::default();
        settings.set_gamma(gamma);
        settings.set_exposure(exposure);
        settings
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Non-finite values are ignored; anything below [`MIN_GAMMA`] is clamped.
    pub fn set_gamma(&mut self, gamma: f32) {
        if gamma.is_finite() {
            self.gamma = gamma.max(MIN_GAMMA);
        }
    }

    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        if exposure.is_finite() {
            self.exposure = exposure;
        }
    }

    pub fn gamma_plus(&mut self) {
        self.set_gamma(self.gamma + GAMMA_STEP);
    }

    pub fn gamma_minus(&mut self) {
        self.set_gamma(self.gamma - GAMMA_STEP);
    }

    pub fn exposure_plus_tenth_stop(&mut self) {
        self.set_exposure(self.exposure + EXPOSURE_FINE_STEP);
    }

    pub fn exposure_minus_tenth_stop(&mut self) {
        self.set_exposure(self.exposure - EXPOSURE_FINE_STEP);
    }

    pub fn exposure_plus_half_stop(&mut self) {
        self.set_exposure(self.exposure + EXPOSURE_COARSE_STEP);
    }

    pub fn exposure_minus_half_stop(&mut self) {
        self.set_exposure(self.exposure - EXPOSURE_COARSE_STEP);
    }

    /// Linear gain applied before the display curve.
    pub fn gain(&self) -> f32 {
        self.exposure.exp2()
    }
}
