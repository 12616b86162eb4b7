use serde::{Deserialize, Serialize};

use super::transition::EmotionTransition;
use super::voice::EmotionProfile;

/// A scheduled simultaneous period between two lines with one attenuated
/// (spec.md GLOSSARY: Overlap).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Overlap {
    pub target_line_id: String,
    pub offset_into_target_ms: u64,
    pub overlap_duration_ms: u64,
    pub volume_attenuation: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineTiming {
    /// Explicit start hint. When absent the scheduler computes it from the
    /// running cursor and `pause_before_ms`.
    #[serde(default)]
    pub start_ms: Option<u64>,
    #[serde(default)]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub pause_before_ms: Option<u64>,
    #[serde(default)]
    pub pause_after_ms: u64,
    /// Must lie in [0.5, 2.0] when present.
    #[serde(default)]
    pub speed_multiplier: Option<f32>,
    #[serde(default)]
    pub overlap: Option<Overlap>,
}

impl LineTiming {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(start) = self.start_ms {
            if let Some(end) = self.end_ms {
                if end < start {
                    return Err(format!("end_ms {} precedes start_ms {}", end, start));
                }
            }
        }
        if let Some(speed) = self.speed_multiplier {
            if !(0.5..=2.0).contains(&speed) {
                return Err(format!(
                    "speed_multiplier {} outside allowed range [0.5, 2.0]",
                    speed
                ));
            }
        }
        if let Some(overlap) = &self.overlap {
            if !(0.0..=1.0).contains(&overlap.volume_attenuation) {
                return Err(format!(
                    "overlap.volume_attenuation {} outside [0,1]",
                    overlap.volume_attenuation
                ));
            }
        }
        Ok(())
    }
}

/// A single line of dialogue (spec.md §3 Line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub id: String,
    pub character_id: String,
    pub text: String,
    #[serde(default)]
    pub emotion: Option<EmotionProfile>,
    #[serde(default)]
    pub transitions: Vec<EmotionTransition>,
    pub timing: LineTiming,
    #[serde(default)]
    pub audio_effects: Vec<String>,
}

impl Line {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}
