//! Persisted user settings (lives in the OS config directory).
//!
//! Every field carries `#[serde(default)]` so a partial JSON file is valid:
//! missing keys fall back to the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GanttError;
use crate::model::{DisplayMode, ViewMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttSettings {
    pub view_mode: ViewMode,
    pub display_mode: DisplayMode,
    /// Height of header and parent rows; child rows are 70% of this.
    pub row_height: f32,
    pub label_column_width: f32,
    pub toast_secs: u64,
    pub error_surface_secs: u64,
    pub flash_delay_ms: u64,
    pub flash_duration_ms: u64,
    /// Below this width the compact list replaces the chart.
    pub narrow_width: f32,
    /// Simulated round-trip of the local backend.
    pub backend_latency_ms: u64,
    /// Snapshot the local backend reads from and writes to.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for GanttSettings {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Week,
            display_mode: DisplayMode::Tasks,
            row_height: 60.0,
            label_column_width: 256.0,
            toast_secs: 7,
            error_surface_secs: 6,
            flash_delay_ms: 100,
            flash_duration_ms: 500,
            narrow_width: 768.0,
            backend_latency_ms: 350,
            snapshot_path: None,
        }
    }
}

impl GanttSettings {
    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs)
    }

    pub fn error_surface_duration(&self) -> Duration {
        Duration::from_secs(self.error_surface_secs)
    }

    pub fn flash_delay(&self) -> Duration {
        Duration::from_millis(self.flash_delay_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn backend_latency(&self) -> Duration {
        Duration::from_millis(self.backend_latency_ms)
    }

    /// Default location of the settings file.
    pub fn default_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load settings, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(GanttError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, GanttError> {
        let json = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&json)?;
        settings.row_height = settings.row_height.clamp(24.0, 200.0);
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), GanttError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// The app's config directory, or the working directory when the OS has none.
pub fn config_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "GanttTimeline")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
