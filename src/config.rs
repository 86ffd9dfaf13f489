//! Capture configuration
//!
//! Serializable configuration for the capture pipeline: recording limits,
//! session-quality preset preferences, and the directory for the temporary
//! recording file.

use crate::error::CaptureResult;
use crate::hal::SessionPreset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Limits applied to a video recording
///
/// Reaching either limit makes the hardware stop the recording on its own;
/// the stop is surfaced through the normal terminal callback and treated as
/// a successful finish.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecordingConfig {
    /// Maximum recording length in seconds
    pub max_duration_secs: Option<f64>,

    /// Maximum recorded file size in bytes
    pub max_bytes: Option<u64>,
}

impl VideoRecordingConfig {
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs_f64)
    }
}

/// Configuration for the capture session manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureConfig {
    /// Video recording limits
    #[serde(default)]
    pub video: VideoRecordingConfig,

    /// Session-quality presets in preference order; the first one both the
    /// active device and the session accept is applied on input attach.
    #[serde(default = "CaptureConfig::default_presets")]
    pub preferred_presets: Vec<SessionPreset>,

    /// Directory for the temporary recording file; defaults to the system
    /// temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            video: VideoRecordingConfig::default(),
            preferred_presets: Self::default_presets(),
            temp_dir: None,
        }
    }
}

impl CaptureConfig {
    fn default_presets() -> Vec<SessionPreset> {
        vec![SessionPreset::High, SessionPreset::Medium, SessionPreset::Low]
    }

    /// The well-known path for the in-progress recording file. Cleared
    /// before each new recording starts.
    pub fn temp_movie_path(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
            .join("movie.mov")
    }

    /// Read a configuration from a JSON file.
    pub fn load(path: &Path) -> CaptureResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| crate::error::CaptureError::Persistence(e.to_string()))?;
        Ok(config)
    }

    /// Write the configuration to a JSON file.
    pub fn save(&self, path: &Path) -> CaptureResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::CaptureError::Persistence(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn config_round_trips_through_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("capture.json");

        let mut config = CaptureConfig::default();
        config.video.max_duration_secs = Some(15.0);
        config.video.max_bytes = Some(64 * 1024 * 1024);

        config.save(&path).unwrap();
        let loaded = CaptureConfig::load(&path).unwrap();

        assert_eq!(loaded.video.max_duration_secs, Some(15.0));
        assert_eq!(loaded.video.max_bytes, Some(64 * 1024 * 1024));
        assert_eq!(loaded.preferred_presets, config.preferred_presets);
    }

    #[test]
    fn default_presets_prefer_high_quality() {
        let config = CaptureConfig::default();
        assert_eq!(
            config.preferred_presets,
            vec![SessionPreset::High, SessionPreset::Medium, SessionPreset::Low]
        );
    }
}
