//! Emotion Curves and Emotion Timeline Engine (spec.md §4.2, §4.5).

pub mod curves;
pub mod timeline;

pub use timeline::{build_timeline, EmotionSegment, EmotionTimelineResult, Keyframe};
