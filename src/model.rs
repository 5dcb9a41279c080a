mod attribute;
mod error;
mod pixel;
mod spec;


pub use attribute::{Attribute, AttributeValue};
pub use error::{CoreError, Result};
pub use pixel::{Linearity, PixelFormat, default_channel_names};
pub use spec::ImageSpec;
