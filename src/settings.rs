use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::player::speed::SpeedSelection;

const SETTINGS_FILE: &str = "settings.toml";

/// User preferences persisted between runs. Anything missing or malformed
/// falls back to defaults; settings never block startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Audio volume, 0.0 to 1.0.
    pub volume: f32,
    /// Last selected playback rate; snapped to a preset on load.
    pub playback_rate: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            playback_rate: 1.0,
        }
    }
}

impl Settings {
    /// Load from the platform config directory.
    pub fn load() -> Self {
        match settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            // Missing file is the common first-run case; stay quiet.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("failed to read {}: {err}", path.display());
                return Self::default();
            }
        };
        match toml::from_str::<Self>(&text) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("ignoring malformed {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = settings_path().context("no config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let text = toml::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.playback_rate = SpeedSelection::from_rate(self.playback_rate).rate();
        self
    }
}

fn settings_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("playhead").join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = Settings {
            volume: 0.4,
            playback_rate: 1.5,
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("absent.toml"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "volume = \"loud\"").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn loaded_values_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "volume = 7.5\nplayback_rate = 1.3").unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.volume, 1.0);
        assert_eq!(loaded.playback_rate, 1.25);
    }
}
