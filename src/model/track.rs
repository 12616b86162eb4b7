use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pcm::PcmBuffer;
use super::voice::EmotionKind;

/// A closed-open time interval `[start_ms, end_ms)` together with the PCM
/// synthesized for it. Owns its buffer and references its `Line` by id
/// (spec.md §3 AudioSegment / GLOSSARY).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioSegment {
    pub line_id: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub pcm: PcmBuffer,
}

/// A character's sorted segments plus the contiguous concatenation of their
/// PCM (spec.md GLOSSARY: Character Track). No inter-line silence is stored
/// here — spatial placement on the master timeline is the mixer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterTrack {
    pub character_id: String,
    pub segments: Vec<AudioSegment>,
    pub pcm: PcmBuffer,
}

impl CharacterTrack {
    pub fn total_samples(&self) -> usize {
        self.segments.iter().map(|s| s.pcm.samples.len()).sum()
    }
}

/// Ordering priority for same-timestamp events (spec.md §5 Ordering
/// guarantees): `line_start < overlap_start < emotion_change < overlap_end <
/// line_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LineStart,
    OverlapStart,
    EmotionChange,
    OverlapEnd,
    LineEnd,
}

impl EventKind {
    fn priority(self) -> u8 {
        match self {
            EventKind::LineStart => 0,
            EventKind::OverlapStart => 1,
            EventKind::EmotionChange => 2,
            EventKind::OverlapEnd => 3,
            EventKind::LineEnd => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub time_ms: u64,
    pub kind: EventKind,
    pub line_id: Option<String>,
    pub character_id: Option<String>,
    pub emotion: Option<EmotionKind>,
}

/// A time-sorted event log plus cumulative speaking time per character
/// (spec.md §3 ConversationTimeline).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationTimeline {
    pub events: Vec<TimelineEvent>,
    pub speaking_time_ms: HashMap<String, u64>,
    pub total_ms: u64,
}

impl ConversationTimeline {
    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    /// Sort by `(time_ms, event_kind_priority)`, stable on insertion order
    /// for exact ties (spec.md §5).
    pub fn sort(&mut self) {
        self.events
            .sort_by_key(|e| (e.time_ms, e.kind.priority()));
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderStatistics {
    pub total_ms: u64,
    pub speaking_time_ms: HashMap<String, u64>,
    pub emotion_distribution: HashMap<EmotionKind, u32>,
    pub overlapping_line_count: u32,
    pub silence_ms: u64,
    pub failed_segments: u32,
}

/// Output of a render (spec.md §3 Lifecycle, §6 Rendered outputs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderResult {
    pub tracks: Vec<CharacterTrack>,
    pub timeline: ConversationTimeline,
    pub statistics: RenderStatistics,
    pub master: Option<PcmBuffer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_sort_by_time_then_priority() {
        let mut timeline = ConversationTimeline::default();
        timeline.push(TimelineEvent {
            time_ms: 100,
            kind: EventKind::LineEnd,
            line_id: None,
            character_id: None,
            emotion: None,
        });
        timeline.push(TimelineEvent {
            time_ms: 100,
            kind: EventKind::LineStart,
            line_id: None,
            character_id: None,
            emotion: None,
        });
        timeline.sort();
        assert_eq!(timeline.events[0].kind, EventKind::LineStart);
        assert_eq!(timeline.events[1].kind, EventKind::LineEnd);
    }

    #[test]
    fn track_total_samples_matches_segment_sum() {
        let track = CharacterTrack {
            character_id: "a".into(),
            segments: vec![
                AudioSegment {
                    line_id: "l1".into(),
                    start_ms: 0,
                    end_ms: 100,
                    pcm: crate::model::pcm::PcmBuffer::new(44100, 2, vec![1, 2, 3, 4]),
                },
                AudioSegment {
                    line_id: "l2".into(),
                    start_ms: 100,
                    end_ms: 200,
                    pcm: crate::model::pcm::PcmBuffer::new(44100, 2, vec![5, 6]),
                },
            ],
            pcm: crate::model::pcm::PcmBuffer::new(44100, 2, vec![1, 2, 3, 4, 5, 6]),
        };
        assert_eq!(track.total_samples(), track.pcm.samples.len());
    }
}
