//! Game settings and preferences
//!
//! Stored as JSON. A missing or broken file never stops the game: `load`
//! falls back to defaults and says so in the log.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::CarArchetype;

/// Default settings location, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "midnight-drag.json";
/// Default local scoreboard location
pub const DEFAULT_SCOREBOARD_PATH: &str = "midnight-drag-scores.json";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Player car archetype
    pub car: CarArchetype,
    /// Name submitted to the leaderboard
    pub player_name: String,
    /// Fixed RNG seed; a fresh one is picked per run when absent
    pub seed: Option<u64>,
    /// Local scoreboard file; None means the scoreboard is offline
    pub scoreboard_path: Option<PathBuf>,
    /// Custom level table; None uses the built-in campaign
    pub levels_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            car: CarArchetype::Standard,
            player_name: "Racer".to_string(),
            seed: None,
            scoreboard_path: Some(PathBuf::from(DEFAULT_SCOREBOARD_PATH)),
            levels_path: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            car: CarArchetype::Muscle,
            player_name: "Vex".to_string(),
            seed: Some(42),
            scoreboard_path: None,
            levels_path: Some(PathBuf::from("levels.json")),
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "car": "Sport" }"#).unwrap();
        let settings = Settings::load(&path);
        assert_eq!(settings.car, CarArchetype::Sport);
        assert_eq!(settings.player_name, "Racer");
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "car = sport").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }
}
