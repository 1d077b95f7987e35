use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::KaguyaError;
use crate::models::SourceList;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub player: PlayerConfig,
    pub tracker: TrackerConfig,
    pub watch: WatchConfig,
    pub device: DeviceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub source_url: String,
    /// Signed-in user's token; watched-position writes need it.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub controls_hide_delay_ms: u64,
    pub touch_tap_threshold_ms: u64,
    pub pointer_tap_threshold_ms: u64,
    pub drag_slop_px: f32,
    pub seek_step_secs: f64,
    pub seek_zone_percent: f32,
    pub indicator_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub remote_save_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    pub info_overlay_delay_ms: u64,
    pub revalidate_secs: u64,
    pub placeholder_url: String,
    pub placeholder_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Touch-primary devices get double-tap seeking and tap-to-hide controls.
    pub touch_primary: bool,
}

impl PlayerConfig {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    /// Double-tap window for the given device class. Zero disables double taps.
    pub fn tap_threshold(&self, touch_primary: bool) -> Duration {
        Duration::from_millis(if touch_primary {
            self.touch_tap_threshold_ms
        } else {
            self.pointer_tap_threshold_ms
        })
    }

    pub fn indicator_duration(&self) -> Duration {
        Duration::from_millis(self.indicator_duration_ms)
    }
}

impl TrackerConfig {
    pub fn remote_save_interval(&self) -> Duration {
        Duration::from_millis(self.remote_save_interval_ms)
    }
}

impl WatchConfig {
    pub fn info_overlay_delay(&self) -> Duration {
        Duration::from_millis(self.info_overlay_delay_ms)
    }

    pub fn revalidate_after(&self) -> Duration {
        Duration::from_secs(self.revalidate_secs)
    }

    pub fn placeholder_sources(&self) -> SourceList {
        SourceList::placeholder(&self.placeholder_url, &self.placeholder_label)
    }
}

impl AppConfig {
    /// Load config: user file if it exists, else built-in defaults.
    pub fn load() -> Result<Self, KaguyaError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, KaguyaError> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            let user_str = std::fs::read_to_string(path)?;
            toml::from_str(&user_str).map_err(|e| KaguyaError::Config(e.to_string()))
        } else {
            toml::from_str(DEFAULT_CONFIG).map_err(|e| KaguyaError::Config(e.to_string()))
        }
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), KaguyaError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), KaguyaError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| KaguyaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the local watch database.
    pub fn db_path() -> PathBuf {
        Self::data_dir().join("kaguya.db")
    }

    /// Ensure the data directory exists and return the DB path.
    pub fn ensure_db_path() -> Result<PathBuf, KaguyaError> {
        let path = Self::db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    pub fn data_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "kaguya")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
