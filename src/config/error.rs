use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("config JSON parse failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config YAML parse failure: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid viewer config: {0}")]
    Invalid(String),
}
