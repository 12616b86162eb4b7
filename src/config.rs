//! Process-wide pipeline configuration (SPEC_FULL.md §1.1): the handful of
//! knobs worth persisting across runs — default provider dispatch order and
//! default mixer options — loaded once at startup and otherwise read-only.
//! Mirrors `setup::config::SetupConfig::load`/`save`: a JSON file in the
//! user's home directory, tolerant of a missing or empty file, falling back
//! to defaults rather than failing the process.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::mixer::MixerOptions;

const CONFIG_FILE: &str = ".voxline_config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Provider names tried in order when a line has no pre-resolved voice
    /// source (engine::select_provider falls through this list before
    /// picking the first registered, emotion-capable provider).
    #[serde(default)]
    pub default_provider_order: Vec<String>,
    #[serde(default)]
    pub default_mixer_options: MixerOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            default_provider_order: Vec::new(),
            default_mixer_options: MixerOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_FILE)
    }

    pub fn load() -> io::Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(PipelineConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(PipelineConfig::default());
        }
        Ok(serde_json::from_str(&content).unwrap_or_default())
    }

    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        let content = serde_json::to_string_pretty(self).unwrap();
        fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_empty_provider_order() {
        let config = PipelineConfig::default();
        assert!(config.default_provider_order.is_empty());
    }

    #[test]
    fn default_mixer_options_round_trip_through_json() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.default_mixer_options.crossfade_ms,
            config.default_mixer_options.crossfade_ms
        );
    }
}
