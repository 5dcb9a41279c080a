mod error;
mod loader;
mod record;


pub use error::{Result, StoreError};
pub use loader::{ImageStore, Progress};
pub use record::{ImageRecord, ResidencyState, SpecHeader};
