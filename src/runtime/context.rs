use std::path::Path;
use std::sync::Arc;

use crate::config::{ViewerConfig, load_config};
use crate::formats::{FormatRegistry, default_registry};
use crate::store::ImageStore;
use crate::viewer::ViewerState;

use super::Result;

/// Shared setup for the command-line tools: the format registry and the
/// viewer configuration.
#[derive(Debug, Clone)]
pub struct AppContext {
    registry: Arc<FormatRegistry>,
    config: ViewerConfig,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext {
    pub fn new() -> Self {
        Self::with_parts(default_registry(), ViewerConfig::default())
    }

    pub fn with_parts(registry: Arc<FormatRegistry>, config: ViewerConfig) -> Self {
        Self { registry, config }
    }

    /// Default registry plus the viewer config at `path`, or the default
    /// config when no path is given.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)?,
            None => ViewerConfig::default(),
        };
        Ok(Self::with_parts(default_registry(), config))
    }

    pub fn registry(&self) -> &Arc<FormatRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// A fresh, empty store over the shared registry.
    pub fn store(&self) -> ImageStore {
        ImageStore::new(Arc::clone(&self.registry))
    }

    pub fn viewer(&self) -> ViewerState {
        ViewerState::new(self.store(), self.config.clone())
    }
}
