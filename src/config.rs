// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{self, detection, timing};
use crate::errors::{AppError, AppResult};
use crate::permissions::PermissionBackendKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// User configuration, stored as JSON in the XDG config directory.
///
/// Missing fields fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How camera permission is checked (auto, portal, device-node, granted, denied)
    pub permission_backend: PermissionBackendKind,
    /// Last used camera device path
    pub last_camera_path: Option<String>,
    /// Minimum time between detection attempts in milliseconds
    pub detection_interval_ms: u64,
    /// Frames are downscaled to this size before decoding
    pub max_dimension: u32,
    /// Seconds a result dialog may stay open before scanning resumes.
    /// `None` waits for the user indefinitely.
    pub presentation_timeout_secs: Option<u64>,
    /// Mirror the viewfinder horizontally
    pub mirror_preview: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            permission_backend: PermissionBackendKind::default(),
            last_camera_path: None,
            detection_interval_ms: detection::DEFAULT_INTERVAL_MS,
            max_dimension: detection::DEFAULT_MAX_DIMENSION,
            presentation_timeout_secs: Some(timing::DEFAULT_PRESENTATION_TIMEOUT_SECS),
            mirror_preview: false,
        }
    }
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/qrreader/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_ID).join(constants::CONFIG_FILE_NAME))
    }

    /// Load from the default location, or defaults if there is none
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("no config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;

        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }

    pub fn presentation_timeout(&self) -> Option<Duration> {
        self.presentation_timeout_secs.map(Duration::from_secs)
    }
}
