use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Grammatical gender the prompt interpreter derived for a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Neutral,
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRange {
    Child,
    Young,
    Adult,
    Senior,
}

impl Default for AgeRange {
    fn default() -> Self {
        AgeRange::Adult
    }
}

/// A closed set of accents the prompt interpreter normalizes free text into.
/// `Other` preserves an unrecognized token rather than discarding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accent {
    Neutral,
    American,
    British,
    Australian,
    Irish,
    Scottish,
    Indian,
    Other(String),
}

impl Default for Accent {
    fn default() -> Self {
        Accent::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timbre {
    Deep,
    Medium,
    High,
}

impl Default for Timbre {
    fn default() -> Self {
        Timbre::Medium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    Normal,
    Fast,
}

impl Default for Pace {
    fn default() -> Self {
        Pace::Normal
    }
}

/// Closed personality tag vocabulary (spec.md §3 VoiceSpec.personality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTag {
    Cheerful,
    Calm,
    Energetic,
    Wise,
    Friendly,
    Professional,
    Dramatic,
    Mysterious,
    Confident,
    Gentle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    Happy,
    Sad,
    Angry,
    Excited,
    Calm,
    Fearful,
    Surprised,
    Neutral,
}

impl Default for EmotionKind {
    fn default() -> Self {
        EmotionKind::Neutral
    }
}

impl EmotionKind {
    /// Maps a free-text name against the closed emotion vocabulary,
    /// case-insensitively. Used by subtitle/script bracket-tag extraction
    /// (spec.md §6: "unknowns are treated as plain text").
    pub fn from_name(name: &str) -> Option<EmotionKind> {
        match name.to_lowercase().as_str() {
            "happy" => Some(EmotionKind::Happy),
            "sad" => Some(EmotionKind::Sad),
            "angry" => Some(EmotionKind::Angry),
            "excited" => Some(EmotionKind::Excited),
            "calm" => Some(EmotionKind::Calm),
            "fearful" => Some(EmotionKind::Fearful),
            "surprised" => Some(EmotionKind::Surprised),
            "neutral" => Some(EmotionKind::Neutral),
            _ => None,
        }
    }
}

/// A named sub-shade of an `EmotionProfile` with its own intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionVariation {
    pub name: String,
    pub intensity: f32,
}

/// The atomic emotion value (spec.md GLOSSARY: Emotion Profile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionProfile {
    pub kind: EmotionKind,
    pub intensity: f32,
    #[serde(default)]
    pub variations: Vec<EmotionVariation>,
}

impl EmotionProfile {
    pub fn new(kind: EmotionKind, intensity: f32) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(0.0, 1.0),
            variations: Vec::new(),
        }
    }

    pub fn neutral() -> Self {
        Self::new(EmotionKind::Neutral, 0.5)
    }
}

impl Default for EmotionProfile {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Derived voice description, not a backend identifier (spec.md §3).
///
/// Every field is always populated — the prompt interpreter never leaves a
/// field unset, it falls back to the documented default instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceSpec {
    pub gender: Gender,
    pub age: AgeRange,
    pub accent: Accent,
    pub timbre: Timbre,
    pub pace: Pace,
    #[serde(default)]
    pub personality: BTreeSet<PersonalityTag>,
    pub default_emotion: EmotionProfile,
}

impl Default for VoiceSpec {
    fn default() -> Self {
        Self {
            gender: Gender::default(),
            age: AgeRange::default(),
            accent: Accent::default(),
            timbre: Timbre::default(),
            pace: Pace::default(),
            personality: BTreeSet::new(),
            default_emotion: EmotionProfile::neutral(),
        }
    }
}
