//! CLI configuration.
//!
//! Settings come from three places, strongest first: command-line flags,
//! `CODECRAFT_*` environment variables (both resolved by clap), and the
//! project's `.codecraft/settings.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Directory holding per-project settings.
pub const SETTINGS_DIR: &str = ".codecraft";

/// Settings file name inside [`SETTINGS_DIR`].
pub const SETTINGS_FILE: &str = "settings.json";

/// Contents of `.codecraft/settings.json`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory the assistant creates entries in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_directory: Option<String>,

    /// Open the project without a write grant
    #[serde(default)]
    pub read_only: bool,
}

impl CliConfig {
    /// Path of the settings file for a project root.
    pub fn path_for(root: &Path) -> PathBuf {
        root.join(SETTINGS_DIR).join(SETTINGS_FILE)
    }

    /// Load the settings of `root`, or defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path_for(root);
        if !path.exists() {
            debug!("No settings file at {}", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }

    /// Apply flag/environment values on top of the file.
    ///
    /// `None` means neither a flag nor the environment set the value.
    pub fn resolve(self, cwd: Option<String>, read_only: Option<bool>) -> Settings {
        Settings {
            current_directory: cwd
                .or(self.current_directory)
                .unwrap_or_else(|| codecraft_fs::path::ROOT.to_string()),
            read_only: read_only.unwrap_or(self.read_only),
        }
    }
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub current_directory: String,
    pub read_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        assert_eq!(CliConfig::load(dir.path()).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_load_settings_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(SETTINGS_DIR)).unwrap();
        std::fs::write(
            CliConfig::path_for(dir.path()),
            r#"{ "currentDirectory": "/src", "readOnly": true }"#,
        )
        .unwrap();

        let config = CliConfig::load(dir.path()).unwrap();
        assert_eq!(config.current_directory.as_deref(), Some("/src"));
        assert!(config.read_only);
    }

    #[test]
    fn test_invalid_settings_file_is_an_error() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(SETTINGS_DIR)).unwrap();
        std::fs::write(CliConfig::path_for(dir.path()), "not json").unwrap();

        let err = CliConfig::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid settings file"));
    }

    #[test]
    fn test_flags_win_over_file() {
        let file = CliConfig {
            current_directory: Some("/src".to_string()),
            read_only: false,
        };

        let settings = file.clone().resolve(Some("/lib".to_string()), Some(true));
        assert_eq!(settings.current_directory, "/lib");
        assert!(settings.read_only);

        let settings = file.resolve(None, None);
        assert_eq!(settings.current_directory, "/src");
        assert!(!settings.read_only);

        assert_eq!(CliConfig::default().resolve(None, None).current_directory, "/");
    }

    #[test]
    fn test_explicit_false_overrides_read_only_file() {
        let file = CliConfig {
            current_directory: None,
            read_only: true,
        };

        assert!(!file.clone().resolve(None, Some(false)).read_only);
        assert!(file.resolve(None, None).read_only);
    }
}
