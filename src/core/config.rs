//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::clock::GameClock;
use crate::customer::DialogueMode;
use crate::orders::DeliverySettings;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Name used for new games
    pub player_name: String,
    /// Game seconds per real second
    pub clock_speed: f64,
    pub dialogue_mode: DialogueMode,
    /// Save file location, overrides the data directory
    pub save_path: Option<PathBuf>,
    /// Order taking preferences
    pub delivery: DeliverySettings,
    /// UI settings
    pub ui: UiConfig,
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub dark_theme: bool,
    pub zoom: f32,
    /// Status panel width
    pub status_width: f32,
    /// Initial window size
    pub window_size: [f32; 2],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            player_name: "Courier Wang".to_string(),
            clock_speed: GameClock::DEFAULT_SPEED,
            dialogue_mode: DialogueMode::Offline,
            save_path: None,
            delivery: DeliverySettings::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dark_theme: true,
            zoom: 1.0,
            status_width: 300.0,
            window_size: [1400.0, 900.0],
        }
    }
}

impl AppConfig {
    pub const APP_NAME: &'static str = "Food Delivery Simulator";

    /// Window title naming the courier
    pub fn window_title(&self) -> String {
        format!("{} - {}", Self::APP_NAME, self.player_name)
    }

    pub(crate) fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "delivery-sim", "DeliverySim")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Where the game is saved
    pub fn resolved_save_path(&self) -> Option<PathBuf> {
        self.save_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("savegame.json"))
        })
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::RiskPreference;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("delivery-sim-config-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = temp_dir("missing");
        let config = AppConfig::load_from(&dir.join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.clock_speed, 60.0);
        assert_eq!(config.ui.status_width, 300.0);
        assert_eq!(config.ui.window_size, [1400.0, 900.0]);
    }

    #[test]
    fn test_window_title_names_player() {
        let mut config = AppConfig::default();
        config.player_name = "Rider".to_string();
        assert_eq!(config.window_title(), "Food Delivery Simulator - Rider");
    }

    #[test]
    fn test_round_trip() {
        let dir = temp_dir("round-trip");
        let path = dir.join("nested").join("config.json");
        let mut config = AppConfig::default();
        config.player_name = "Rider".to_string();
        config.delivery.risk = RiskPreference::Aggressive;
        config.ui.dark_theme = false;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = temp_dir("partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{ "player_name": "Ada", "ui": { "zoom": 1.5 } }"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.player_name, "Ada");
        assert_eq!(config.ui.zoom, 1.5);
        assert!(config.ui.dark_theme);
        assert_eq!(config.delivery, DeliverySettings::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = temp_dir("invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
