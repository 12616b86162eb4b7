use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

use super::character::Character;
use super::line::Line;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default = "default_pause_between_lines_ms")]
    pub pause_between_lines_ms: u64,
    #[serde(default = "default_crossfade_ms")]
    pub crossfade_ms: u32,
    #[serde(default = "default_master_volume")]
    pub master_volume: f32,
    #[serde(default)]
    pub natural_timing: bool,
}

fn default_pause_between_lines_ms() -> u64 {
    300
}
fn default_crossfade_ms() -> u32 {
    50
}
fn default_master_volume() -> f32 {
    1.0
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            pause_between_lines_ms: default_pause_between_lines_ms(),
            crossfade_ms: default_crossfade_ms(),
            master_volume: default_master_volume(),
            natural_timing: false,
        }
    }
}

impl GlobalSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(0.0..=2.0).contains(&self.master_volume) {
            return Err(PipelineError::InvalidPlan {
                reason: format!(
                    "global_settings.master_volume {} outside [0,2]",
                    self.master_volume
                ),
            });
        }
        Ok(())
    }
}

/// Full input to the synthesis pipeline (spec.md §3 RenderPlan).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderPlan {
    pub characters: Vec<Character>,
    pub lines: Vec<Line>,
    #[serde(default)]
    pub global_settings: GlobalSettings,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl RenderPlan {
    /// Validation performed by the Conversation Scheduler's first step
    /// (spec.md §4.6 step 1): character ids unique, every line references a
    /// known character, overlap targets resolve, line ids unique.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.global_settings.validate()?;

        let mut character_ids = HashSet::new();
        for c in &self.characters {
            if !character_ids.insert(c.id.as_str()) {
                return Err(PipelineError::InvalidPlan {
                    reason: format!("duplicate character id '{}'", c.id),
                });
            }
        }

        let mut line_ids = HashSet::new();
        for line in &self.lines {
            if !line_ids.insert(line.id.as_str()) {
                return Err(PipelineError::InvalidPlan {
                    reason: format!("duplicate line id '{}'", line.id),
                });
            }
            if !character_ids.contains(line.character_id.as_str()) {
                return Err(PipelineError::InvalidPlan {
                    reason: format!(
                        "line '{}' references unknown character '{}'",
                        line.id, line.character_id
                    ),
                });
            }
            line.timing.validate().map_err(|reason| PipelineError::InvalidPlan { reason })?;
            if let Some(start) = line.timing.start_ms {
                let _ = start; // u64, always >= 0
            }
        }

        let line_position: HashMap<&str, usize> = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, l)| (l.id.as_str(), i))
            .collect();

        for (i, line) in self.lines.iter().enumerate() {
            if let Some(overlap) = &line.timing.overlap {
                if !line_ids.contains(overlap.target_line_id.as_str()) {
                    return Err(PipelineError::InvalidPlan {
                        reason: format!(
                            "line '{}' overlap targets unknown line '{}'",
                            line.id, overlap.target_line_id
                        ),
                    });
                }
                if overlap.target_line_id == line.id {
                    return Err(PipelineError::InvalidPlan {
                        reason: format!("line '{}' cannot overlap itself", line.id),
                    });
                }
                // The scheduler resolves overlap offsets against the
                // target's already-computed schedule in a single forward
                // pass (spec.md §4.6 step 2), so the target must precede
                // the overlapping line in plan order.
                let target_position = line_position
                    .get(overlap.target_line_id.as_str())
                    .copied()
                    .expect("target_line_id presence just checked above");
                if target_position >= i {
                    return Err(PipelineError::InvalidPlan {
                        reason: format!(
                            "line '{}' overlaps target '{}' which does not precede it in plan order",
                            line.id, overlap.target_line_id
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn line(&self, id: &str) -> Option<&Line> {
        self.lines.iter().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::line::LineTiming;
    use crate::model::voice::VoiceSpec;

    fn plan_with(lines: Vec<Line>) -> RenderPlan {
        RenderPlan {
            characters: vec![Character::new("a", "Alice", VoiceSpec::default())],
            lines,
            global_settings: GlobalSettings::default(),
            metadata: HashMap::new(),
        }
    }

    fn line(id: &str, character_id: &str) -> Line {
        Line {
            id: id.to_string(),
            character_id: character_id.to_string(),
            text: "hello world".to_string(),
            emotion: None,
            transitions: Vec::new(),
            timing: LineTiming::default(),
            audio_effects: Vec::new(),
        }
    }

    #[test]
    fn rejects_unknown_character() {
        let plan = plan_with(vec![line("l1", "ghost")]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_line_ids() {
        let plan = plan_with(vec![line("l1", "a"), line("l1", "a")]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn accepts_valid_plan() {
        let plan = plan_with(vec![line("l1", "a")]);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn rejects_overlap_targeting_a_later_line() {
        let mut first = line("l1", "a");
        first.timing.overlap = Some(crate::model::line::Overlap {
            target_line_id: "l2".to_string(),
            offset_into_target_ms: 0,
            overlap_duration_ms: 100,
            volume_attenuation: 0.3,
        });
        let plan = plan_with(vec![first, line("l2", "a")]);
        assert!(plan.validate().is_err());
    }

    #[test]
    fn accepts_overlap_targeting_an_earlier_line() {
        let mut second = line("l2", "a");
        second.timing.overlap = Some(crate::model::line::Overlap {
            target_line_id: "l1".to_string(),
            offset_into_target_ms: 0,
            overlap_duration_ms: 100,
            volume_attenuation: 0.3,
        });
        let plan = plan_with(vec![line("l1", "a"), second]);
        assert!(plan.validate().is_ok());
    }
}
