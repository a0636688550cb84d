use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

fn default_trend_months() -> usize {
    3
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrendsConfig {
    #[serde(default = "default_trend_months")]
    pub months: usize,
}

impl Default for TrendsConfig {
    fn default() -> Self {
        TrendsConfig {
            months: default_trend_months(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DisplayConfig {
    /// Hide categories with neither plan nor actual in summary tables.
    #[serde(default, alias = "hide_zero")]
    pub hide_empty_rows: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "pfdash", "pfdash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "pfdash", "pfdash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "/tmp/pfdash-data"
trends:
  months: 6
display:
  hide_empty_rows: true
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/pfdash-data"));
        assert_eq!(config.trends.months, 6);
        assert!(config.display.hide_empty_rows);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/pfdash-data")
        );
    }

    #[test]
    fn test_config_defaults_and_legacy_flag() {
        let config: AppConfig = serde_yaml::from_str("display:\n  hide_zero: true\n").unwrap();
        assert!(config.data_path.is_none());
        assert_eq!(config.trends.months, 3);
        assert!(config.display.hide_empty_rows);

        let empty: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert!(!empty.display.hide_empty_rows);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load_from_path(dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
