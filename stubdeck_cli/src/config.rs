//! CLI configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use stubdeck_common::{parse_instances, Instance};

/// Environment variable holding the comma-separated instance URLs
pub const URLS_ENV: &str = "STUBDECK_URLS";

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stubdeck")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stubdeck")
    }
}

/// Get the config file path
pub fn config_file() -> PathBuf {
    config_dir().join("config.yml")
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all config directories exist
pub fn ensure_dirs() -> Result<()> {
    let config = config_dir();
    let logs = logs_dir();

    fs::create_dir_all(&config).context("Failed to create config directory")?;
    fs::create_dir_all(&logs).context("Failed to create logs directory")?;

    Ok(())
}

/// Parse the instance registry from `--urls` / `STUBDECK_URLS`
pub fn load_instances(raw: &str) -> Result<Vec<Instance>> {
    let instances = parse_instances(raw).context("Invalid instance configuration")?;
    tracing::debug!(count = instances.len(), "Loaded instance registry");
    Ok(instances)
}

/// Colour theme of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    /// Terminal preference from `COLORFGBG` ("fg;bg"), if it says anything
    pub fn from_terminal() -> Option<Self> {
        let value = std::env::var("COLORFGBG").ok()?;
        Self::from_colorfgbg(&value)
    }

    fn from_colorfgbg(value: &str) -> Option<Self> {
        let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
        Some(if background == 7 || background == 15 {
            Theme::Light
        } else {
            Theme::Dark
        })
    }
}

/// Persisted client settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Last theme chosen in the dashboard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl Settings {
    /// Load settings from file
    pub fn load() -> Result<Self> {
        let path = config_file();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let settings: Settings =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        Ok(settings)
    }

    /// Save settings to file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        let path = config_file();
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Saved theme, else the terminal's preference, else dark
    pub fn resolve_theme(&self) -> Theme {
        self.theme
            .or_else(Theme::from_terminal)
            .unwrap_or(Theme::Dark)
    }

    /// Record a theme choice
    pub fn store_theme(theme: Theme) -> Result<()> {
        let mut settings = Self::load().unwrap_or_default();
        settings.theme = Some(theme);
        settings.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colorfgbg_background() {
        assert_eq!(Theme::from_colorfgbg("0;15"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("0;default;7"), Some(Theme::Light));
        assert_eq!(Theme::from_colorfgbg("15;0"), Some(Theme::Dark));
        assert_eq!(Theme::from_colorfgbg("garbage"), None);
    }

    #[test]
    fn test_saved_theme_wins() {
        let settings = Settings {
            theme: Some(Theme::Light),
        };
        assert_eq!(settings.resolve_theme(), Theme::Light);
    }

    #[test]
    fn test_settings_yaml_roundtrip() {
        let yaml = serde_yaml::to_string(&Settings {
            theme: Some(Theme::Dark),
        })
        .unwrap();
        assert!(yaml.contains("theme: dark"));

        let parsed: Settings = serde_yaml::from_str("theme: light\n").unwrap();
        assert_eq!(parsed.theme, Some(Theme::Light));

        let empty: Settings = serde_yaml::from_str("{}").unwrap();
        assert_eq!(empty.theme, None);
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled().as_str(), "dark");
    }
}
