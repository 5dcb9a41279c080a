pub const MIN_MAGNIFICATION: f32 = 1.0 / 64.0;
pub const MAX_MAGNIFICATION: f32 = 64.0;
pub const ZOOM_STEP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub step: f32,
    pub min_magnification: f32,
    pub max_magnification: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: ZOOM_STEP,
            min_magnification: MIN_MAGNIFICATION,
            max_magnification: MAX_MAGNIFICATION,
        }
    }
}

impl ZoomLimits {
    fn clamp(&self, magnification: f32) -> f32 {
        magnification.clamp(self.min_magnification, self.max_magnification)
    }
}

/// Display scale of the current image.
///
/// Stored as a positive magnification. The signed form used by [`Zoom::signed`]
/// reads `z >= 1` as "magnify by `z`" and `z <= -1` as "shrink to `1/|z|`".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    magnification: f32,
    scale_to_fit: bool,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            magnification: 1.0,
            scale_to_fit: false,
        }
    }
}

impl Zoom {
    pub fn magnification(&self) -> f32 {
        self.magnification
    }

    pub fn scale_to_fit(&self) -> bool {
        self.scale_to_fit
    }

    pub fn signed(&self) -> f32 {
        if self.magnification >= 1.0 {
            self.magnification
        } else {
            -1.0 / self.magnification
        }
    }

    /// Converts a signed zoom to a magnification. Values strictly between -1
    /// and 1 are taken as a magnification directly; zero and non-finite
    /// values have no meaning.
    pub fn magnification_from_signed(zoom: f32) -> Option<f32> {
        if !zoom.is_finite() || zoom == 0.0 {
            None
        } else if zoom <= -1.0 {
            Some(-1.0 / zoom)
        } else if zoom < 0.0 {
            Some(-zoom)
        } else {
            Some(zoom)
        }
    }

    pub fn set_magnification(&mut self, magnification: f32, limits: &ZoomLimits) {
        self.magnification = limits.clamp(magnification);
        self.scale_to_fit = false;
    }

    pub fn zoom_in(&mut self, limits: &ZoomLimits) {
        self.set_magnification(self.magnification * limits.step, limits);
    }

    pub fn zoom_out(&mut self, limits: &ZoomLimits) {
        self.set_magnification(self.magnification / limits.step, limits);
    }

    pub fn normal_size(&mut self) {
        self.magnification = 1.0;
        self.scale_to_fit = false;
    }

    /// Largest magnification that shows the whole image inside the window.
    pub fn fit_to_window(
        &mut self,
        window_width: f32,
        window_height: f32,
        image_width: usize,
        image_height: usize,
        limits: &ZoomLimits,
    ) {
        let image_w = image_width.max(1) as f32;
        let image_h = image_height.max(1) as f32;
        let fit = (window_width / image_w).min(window_height / image_h);
        self.magnification = if fit.is_finite() && fit > 0.0 {
            limits.clamp(fit)
        } else {
            limits.min_magnification
        };
        self.scale_to_fit = true;
    }

    /// On-screen size of an image at the current magnification.
    pub fn display_size(&self, image_width: usize, image_height: usize) -> (u32, u32) {
        let scale = |extent: usize| ((extent as f32 * self.magnification).round() as u32).max(1);
        (scale(image_width), scale(image_height))
    }
}
