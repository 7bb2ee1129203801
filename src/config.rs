use crate::error::{Result, StoryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Viewer tuning, persisted as JSON in the user's config directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// How long one segment plays before auto-advancing
    pub segment_duration_ms: u64,
    /// Period of the driver's clock tick
    pub tick_interval_ms: u64,
    /// Length of a programmatic page turn
    pub page_animation_ms: u64,
    /// Hold time after which a press counts as a long-press
    pub long_press_ms: u64,
    /// Pages on either side of the current one that stay mounted
    pub preload_radius: usize,
    /// Park released pages instead of dropping them (keeps their segment index)
    pub keep_alive: bool,
    /// Width of the "back" tap region as a fraction of the content width
    pub back_region_fraction: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            segment_duration_ms: 5000,
            tick_interval_ms: 16,
            page_animation_ms: 300,
            long_press_ms: 250,
            preload_radius: 1,
            keep_alive: true,
            back_region_fraction: 0.5,
        }
    }
}

impl ViewerConfig {
    pub fn segment_duration(&self) -> Duration {
        Duration::from_millis(self.segment_duration_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn page_animation(&self) -> Duration {
        Duration::from_millis(self.page_animation_ms)
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    /// Clamp values that would otherwise produce nonsense at runtime
    pub fn normalized(mut self) -> Self {
        self.tick_interval_ms = self.tick_interval_ms.max(1);
        self.back_region_fraction = if self.back_region_fraction.is_finite() {
            self.back_region_fraction.clamp(0.0, 1.0)
        } else {
            0.5
        };
        self
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("storydeck").join("settings.json"))
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring unreadable settings: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| StoryError::io(path, e))?;
        let config: Self = serde_json::from_str(&contents)?;
        debug!("Loaded settings from {}", path.display());
        Ok(config.normalized())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(StoryError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoryError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| StoryError::io(path, e))
    }
}
