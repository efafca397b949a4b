//! Error types for configuration loading.

/// Errors that can occur when loading a `tracecmp.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed, or names an unknown key or value.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),
}
