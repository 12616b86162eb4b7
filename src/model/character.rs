use serde::{Deserialize, Serialize};

use super::voice::{EmotionKind, EmotionProfile, Pace, VoiceSpec};

/// A single personality trait with its strength (spec.md §3 Personality).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trait {
    pub name: String,
    pub intensity: f32,
}

/// How a character habitually delivers lines (spec.md §3 Personality.speaking_style).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeakingStyle {
    pub pace: Pace,
    pub formality: f32,
    pub confidence: f32,
    pub enthusiasm: f32,
    pub interruption_tendency: f32,
}

impl Default for SpeakingStyle {
    fn default() -> Self {
        Self {
            pace: Pace::Normal,
            formality: 0.5,
            confidence: 0.5,
            enthusiasm: 0.5,
            interruption_tendency: 0.5,
        }
    }
}

/// The range of emotion a character is allowed to express
/// (spec.md §3 Personality.emotional_range).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalRange {
    pub baseline: EmotionProfile,
    pub volatility: f32,
    pub max_intensity: f32,
    #[serde(default)]
    pub dominant_emotions: Vec<EmotionKind>,
}

impl Default for EmotionalRange {
    fn default() -> Self {
        Self {
            baseline: EmotionProfile::neutral(),
            volatility: 0.3,
            max_intensity: 1.0,
            dominant_emotions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Personality {
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default)]
    pub speaking_style: SpeakingStyle,
    #[serde(default)]
    pub emotional_range: EmotionalRange,
    #[serde(default)]
    pub verbosity: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechPatterns {
    /// Catchphrases the character may use (inserted only in non-deterministic
    /// SSML emission, spec.md §4.3).
    #[serde(default)]
    pub catchphrases: Vec<String>,
    /// Filler words the character tends to use.
    #[serde(default)]
    pub fillers: Vec<String>,
}

/// A speaker in a `RenderPlan` (spec.md §3 Character).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub voice_spec: VoiceSpec,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub speech_patterns: SpeechPatterns,
    pub default_emotion: EmotionProfile,
}

impl Character {
    pub fn new(id: impl Into<String>, name: impl Into<String>, voice_spec: VoiceSpec) -> Self {
        let default_emotion = voice_spec.default_emotion.clone();
        Self {
            id: id.into(),
            name: name.into(),
            voice_spec,
            personality: Personality::default(),
            speech_patterns: SpeechPatterns::default(),
            default_emotion,
        }
    }
}
