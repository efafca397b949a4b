//! Loading of `tracecmp.toml` tool configuration files.
//!
//! The file sets defaults for parsing and comparison; command-line flags are
//! applied on top by the caller.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::ToolConfig;
