use serde::{Deserialize, Serialize};

use super::voice::EmotionProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Bezier,
}

/// The condition that positions a transition on the line's time axis.
///
/// Resolved form — exactly one variant. See [`TriggerSpec`] for the wire
/// form, which allows several fields to be populated and resolves them by
/// precedence (spec.md §4.5 step 2: `time > word > position > marker`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Absolute time in ms.
    Time(u64),
    /// Literal word to match, case-insensitive, whole-word.
    Word(String),
    /// Character position in the line's text.
    Position(usize),
    /// A bracketed marker of the form `[NAME]`.
    Marker(String),
}

/// The wire/input form of a trigger: a caller may populate several fields;
/// [`TriggerSpec::resolve`] picks the one precedence gives priority to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    #[serde(default)]
    pub time_ms: Option<u64>,
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default)]
    pub marker: Option<String>,
}

impl TriggerSpec {
    /// Resolve by precedence: `time > word > position > marker`. Returns
    /// `None` if no field was populated.
    pub fn resolve(&self) -> Option<Trigger> {
        if let Some(t) = self.time_ms {
            return Some(Trigger::Time(t));
        }
        if let Some(w) = &self.word {
            return Some(Trigger::Word(w.clone()));
        }
        if let Some(p) = self.position {
            return Some(Trigger::Position(p));
        }
        if let Some(m) = &self.marker {
            return Some(Trigger::Marker(m.clone()));
        }
        None
    }
}

/// A time-bounded morph between two `EmotionProfile`s, gated by a `Trigger`
/// and shaped by a `Curve` (spec.md §3 EmotionTransition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionTransition {
    pub from: EmotionProfile,
    pub to: EmotionProfile,
    pub duration_ms: u32,
    pub curve: Curve,
    /// Required and only valid when `curve == Bezier`; both points in [0,1]^2.
    #[serde(default)]
    pub control_points: Option<[(f32, f32); 2]>,
    pub trigger: Trigger,
}

/// Default bounds for transition validation (spec.md §4.5 Validation).
pub const MIN_TRANSITION_DURATION_MS: u32 = 500;
pub const MAX_TRANSITION_DURATION_MS: u32 = 3000;
pub const DEFAULT_INTENSITY_THRESHOLD: f32 = 0.1;

impl EmotionTransition {
    /// Validates duration bounds, bezier control point requirements, and the
    /// minimum intensity delta. Does not resolve the trigger time — that is
    /// the timeline engine's job, since it needs the line's text.
    pub fn validate(
        &self,
        min_duration_ms: u32,
        max_duration_ms: u32,
        intensity_threshold: f32,
    ) -> Result<(), String> {
        if self.duration_ms < min_duration_ms || self.duration_ms > max_duration_ms {
            return Err(format!(
                "duration_ms {} outside allowed range [{}, {}]",
                self.duration_ms, min_duration_ms, max_duration_ms
            ));
        }
        if (self.to.intensity - self.from.intensity).abs() < intensity_threshold {
            return Err(format!(
                "intensity delta {} below threshold {}",
                (self.to.intensity - self.from.intensity).abs(),
                intensity_threshold
            ));
        }
        match self.curve {
            Curve::Bezier => match self.control_points {
                Some(cps) => {
                    for (x, y) in cps {
                        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                            return Err("bezier control points must lie in [0,1]".to_string());
                        }
                    }
                }
                None => return Err("bezier curve requires control_points".to_string()),
            },
            _ => {
                if self.control_points.is_some() {
                    return Err("control_points is only valid for the bezier curve".to_string());
                }
            }
        }
        Ok(())
    }
}
