//! Shared data types for the synthesis pipeline (spec.md §3).

pub mod character;
pub mod line;
pub mod pcm;
pub mod plan;
pub mod scene;
pub mod track;
pub mod transition;
pub mod voice;

pub use character::{Character, EmotionalRange, Personality, SpeakingStyle, SpeechPatterns, Trait};
pub use line::{Line, LineTiming, Overlap};
pub use pcm::{PcmBuffer, Resampler, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};
pub use plan::{GlobalSettings, RenderPlan};
pub use scene::{Location, Mood, SceneContext, TimeOfDay};
pub use track::{
    AudioSegment, CharacterTrack, ConversationTimeline, EventKind, RenderResult, RenderStatistics,
    TimelineEvent,
};
pub use transition::{Curve, EmotionTransition, Trigger, TriggerSpec};
pub use voice::{
    AgeRange, Accent, EmotionKind, EmotionProfile, EmotionVariation, Gender, Pace, PersonalityTag,
    Timbre, VoiceSpec,
};
