//! Configuration file loading.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;
use crate::types::ToolConfig;

/// File name looked up by [`find_config`].
pub const CONFIG_FILE_NAME: &str = "tracecmp.toml";

/// Loads a configuration file.
pub fn load_config(path: &Path) -> Result<ToolConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = load_config_from_str(&content)?;
    debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Parses a configuration from a string.
///
/// Unknown tables are rejected so a misspelt section does not silently fall
/// back to defaults.
pub fn load_config_from_str(content: &str) -> Result<ToolConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Returns `<dir>/tracecmp.toml` if it exists.
pub fn find_config(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracecmp_compare::PaddingPolicy;
    use tracecmp_trace::DuplicatePolicy;

    #[test]
    fn empty_config_is_default() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.compare.max_divergences, 1);
        assert_eq!(config.compare.padding, PaddingPolicy::Zero);
        assert_eq!(config.parse.duplicate_changes, DuplicatePolicy::Reject);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[parse]
duplicate-changes = "last-wins"

[compare]
padding = "unknown"
max-divergences = 0
align-timescales = true
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.parse.duplicate_changes, DuplicatePolicy::LastWins);
        assert_eq!(config.compare.padding, PaddingPolicy::Unknown);
        assert_eq!(config.compare.max_divergences, 0);
        assert!(config.compare.align_timescales);
    }

    #[test]
    fn partial_table_keeps_other_defaults() {
        let config = load_config_from_str("[compare]\nmax-divergences = 5\n").unwrap();
        assert_eq!(config.compare.max_divergences, 5);
        assert_eq!(config.compare.padding, PaddingPolicy::Zero);
        assert!(!config.compare.align_timescales);
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_config_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_policy_errors() {
        let err = load_config_from_str("[compare]\npadding = \"ones\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn unknown_table_errors() {
        let err = load_config_from_str("[comparison]\npadding = \"zero\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn misspelt_key_errors() {
        let err = load_config_from_str("[compare]\nmax-divergence = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn negative_limit_errors() {
        let err = load_config_from_str("[compare]\nmax-divergences = -1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[compare]\nalign-timescales = true\n").unwrap();

        assert_eq!(find_config(dir.path()), Some(path.clone()));
        assert!(load_config(&path).unwrap().compare.align_timescales);
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_config(dir.path()), None);
        let err = load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
