mod channel;
mod settings;
mod transform;


pub use channel::ChannelView;
pub use settings::{
    DisplaySettings, EXPOSURE_COARSE_STEP, EXPOSURE_FINE_STEP, GAMMA_STEP, MIN_GAMMA,
};
pub use transform::{
    DisplayTransform, LUMINANCE_WEIGHTS, linear_to_srgb, quantize_u8, srgb_to_linear, thumbnail,
    to_rgba8,
};
