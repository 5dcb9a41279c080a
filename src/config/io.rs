use std::fs;
use std::path::Path;

use log::debug;

use super::{Result, ViewerConfig};

/// Reads a viewer config from JSON, or YAML for `.yaml`/`.yml` files.
/// Missing fields take their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<ViewerConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let config = if matches!(extension.as_str(), "yaml" | "yml") {
        serde_yaml::from_str::<ViewerConfig>(&raw)?
    } else {
        serde_json::from_str::<ViewerConfig>(&raw)?
    };
    config.validate()?;
    debug!("loaded viewer config from {}", path.display());
    Ok(config)
}
