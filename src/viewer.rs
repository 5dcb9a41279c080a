mod state;
mod zoom;

#[cfg(test)]
mod tests;

pub use state::ViewerState;
pub use zoom::{MAX_MAGNIFICATION, MIN_MAGNIFICATION, ZOOM_STEP, Zoom, ZoomLimits};
