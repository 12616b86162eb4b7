use serde::{Deserialize, Serialize};

/// Supplied, not computed: the core consumes a scene description, it does
/// not analyze video or audio to produce one (spec.md §1 out-of-scope list).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Indoor,
    Outdoor,
    Vehicle,
    LargeHall,
    SmallRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Day,
    Evening,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Neutral,
    Tense,
    Calm,
    Joyful,
    Somber,
    Chaotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub location: Location,
    pub time_of_day: TimeOfDay,
    pub mood: Mood,
    /// Normalized ambient noise level, `[0,1]`.
    pub ambient_noise_level: f32,
}

impl SceneContext {
    pub fn neutral() -> Self {
        Self {
            location: Location::Indoor,
            time_of_day: TimeOfDay::Day,
            mood: Mood::Neutral,
            ambient_noise_level: 0.0,
        }
    }
}
