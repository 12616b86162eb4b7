//! Per-utterance emotion keyframes compiled into a continuous intensity
//! curve and a sequence of per-segment emotional states (spec.md §4.5).

use crate::model::transition::{EmotionTransition, Trigger};
use crate::model::voice::EmotionProfile;

use super::curves;

/// Character-per-second constant used for trigger-time and token-nominal-time
/// computation (spec.md §4.5 step 2, and the Open Question in spec.md §9:
/// this is deliberately distinct from the 180 wpm constant used for line
/// duration estimation).
pub const CHARS_PER_SECOND: f64 = 15.0;
/// Words-per-minute constant used only for estimating a line's total
/// duration when no external timing is supplied (spec.md §4.5 step 4).
pub const WORDS_PER_MINUTE: f64 = 180.0;

pub const DEFAULT_MIN_TRANSITION_DURATION_MS: u32 = 500;
pub const DEFAULT_MAX_TRANSITION_DURATION_MS: u32 = 3000;
pub const DEFAULT_INTENSITY_THRESHOLD: f32 = 0.1;

fn char_index_to_ms(char_index: usize) -> u64 {
    ((char_index as f64 / CHARS_PER_SECOND) * 1000.0).round() as u64
}

/// A time-stamped Emotion Profile in a Timeline (spec.md GLOSSARY: Keyframe).
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub time_ms: u64,
    pub emotion: EmotionProfile,
    /// Index into the line's `transitions` slice, when this keyframe opens a
    /// transition window (i.e. it is the `from` endpoint).
    pub transition_index: Option<usize>,
}

/// A time-sliced piece of text with an effective Emotion State (spec.md
/// GLOSSARY: Emotion Segment).
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionSegment {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    pub emotion: EmotionProfile,
    pub is_transition: bool,
    pub progress: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct EmotionTimelineResult {
    pub keyframes: Vec<Keyframe>,
    pub segments: Vec<EmotionSegment>,
    pub total_duration_ms: u64,
    pub transition_count: usize,
}

/// Resolves a transition's trigger to an absolute time in the line's text,
/// per spec.md §4.5 step 2. Returns `None` if the trigger cannot be located
/// (e.g. a word trigger whose word never occurs).
fn resolve_trigger_time_ms(text: &str, trigger: &Trigger) -> Option<u64> {
    match trigger {
        Trigger::Time(ms) => Some(*ms),
        Trigger::Word(word) => {
            let lower_text = text.to_lowercase();
            let lower_word = word.to_lowercase();
            find_whole_word(&lower_text, &lower_word).map(char_index_to_ms)
        }
        Trigger::Position(pos) => Some(char_index_to_ms(*pos)),
        Trigger::Marker(name) => {
            let marker = format!("[{name}]");
            text.find(&marker)
                .map(|byte_idx| text[..byte_idx].chars().count())
                .map(char_index_to_ms)
        }
    }
}

/// Finds the first case-insensitive whole-word occurrence of `word` in
/// `text` (both already lowercased), returning its character index.
fn find_whole_word(text: &str, word: &str) -> Option<usize> {
    if word.is_empty() {
        return None;
    }
    let chars: Vec<char> = text.chars().collect();
    let word_chars: Vec<char> = word.chars().collect();
    let is_boundary = |c: char| !(c.is_alphanumeric() || c == '\'');

    let mut i = 0;
    while i + word_chars.len() <= chars.len() {
        if chars[i..i + word_chars.len()] == word_chars[..] {
            let left_ok = i == 0 || is_boundary(chars[i - 1]);
            let right_ok =
                i + word_chars.len() == chars.len() || is_boundary(chars[i + word_chars.len()]);
            if left_ok && right_ok {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}

struct ResolvedTransition<'a> {
    index: usize,
    transition: &'a EmotionTransition,
    start_ms: u64,
}

/// Builds the keyframe timeline from validated, resolvable transitions.
/// Transitions that fail validation or whose trigger cannot be resolved are
/// dropped silently with a `tracing::warn!` (spec.md §4.5 Validation, §7
/// `InvalidTransition`).
fn build_keyframes(
    text: &str,
    default_emotion: &EmotionProfile,
    transitions: &[EmotionTransition],
    min_duration_ms: u32,
    max_duration_ms: u32,
    intensity_threshold: f32,
) -> (Vec<Keyframe>, usize) {
    let mut keyframes = vec![Keyframe {
        time_ms: 0,
        emotion: default_emotion.clone(),
        transition_index: None,
    }];

    let mut resolved: Vec<ResolvedTransition> = Vec::new();

    for (index, transition) in transitions.iter().enumerate() {
        if let Err(reason) =
            transition.validate(min_duration_ms, max_duration_ms, intensity_threshold)
        {
            tracing::warn!(
                "dropping emotion transition {index}: {reason}"
            );
            continue;
        }
        match resolve_trigger_time_ms(text, &transition.trigger) {
            Some(start_ms) => resolved.push(ResolvedTransition {
                index,
                transition,
                start_ms,
            }),
            None => {
                tracing::warn!(
                    "dropping emotion transition {index}: trigger did not resolve"
                );
            }
        }
    }

    let transition_count = resolved.len();

    for r in &resolved {
        keyframes.push(Keyframe {
            time_ms: r.start_ms,
            emotion: r.transition.from.clone(),
            transition_index: Some(r.index),
        });
        keyframes.push(Keyframe {
            time_ms: r.start_ms + r.transition.duration_ms as u64,
            emotion: r.transition.to.clone(),
            transition_index: None,
        });
    }

    // Stable sort by time preserves insertion order for ties (spec.md §3
    // EmotionTimeline: "ties broken by insertion order").
    keyframes.sort_by_key(|k| k.time_ms);

    (keyframes, transition_count)
}

/// Returns the keyframe index whose window contains `time_ms`: the last
/// keyframe with `time_ms <= time_ms` (i.e. the interval's left endpoint).
fn left_keyframe_index(keyframes: &[Keyframe], time_ms: u64) -> usize {
    let mut idx = 0;
    for (i, kf) in keyframes.iter().enumerate() {
        if kf.time_ms <= time_ms {
            idx = i;
        } else {
            break;
        }
    }
    idx
}

struct TokenSpan {
    text: String,
    start_char: usize,
}

fn whitespace_tokens(text: &str) -> Vec<TokenSpan> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut current_start = 0usize;
    let mut in_token = false;

    for (char_index, ch) in text.chars().enumerate() {
        if ch.is_whitespace() {
            if in_token {
                tokens.push(TokenSpan {
                    text: std::mem::take(&mut current),
                    start_char: current_start,
                });
                in_token = false;
            }
        } else {
            if !in_token {
                current_start = char_index;
                in_token = true;
            }
            current.push(ch);
        }
    }
    if in_token {
        tokens.push(TokenSpan {
            text: current,
            start_char: current_start,
        });
    }
    tokens
}

/// Compiles a line's text and transitions into a keyframe timeline and a
/// per-token segment sequence (spec.md §4.5).
pub fn build_timeline(
    text: &str,
    default_emotion: &EmotionProfile,
    transitions: &[EmotionTransition],
    min_duration_ms: u32,
    max_duration_ms: u32,
    intensity_threshold: f32,
) -> EmotionTimelineResult {
    let (keyframes, transition_count) = build_keyframes(
        text,
        default_emotion,
        transitions,
        min_duration_ms,
        max_duration_ms,
        intensity_threshold,
    );

    let tokens = whitespace_tokens(text);
    let word_count = tokens.len().max(1);
    let total_duration_ms = ((word_count as f64 / WORDS_PER_MINUTE) * 60_000.0).round() as u64;

    let mut segments = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let token_time_ms = char_index_to_ms(token.start_char);
        let left_idx = left_keyframe_index(&keyframes, token_time_ms);
        let left = &keyframes[left_idx];

        let end_char = tokens
            .get(i + 1)
            .map(|t| t.start_char)
            .unwrap_or_else(|| text.chars().count());
        let end_ms = char_index_to_ms(end_char).max(token_time_ms);

        let (emotion, is_transition, progress) = match left.transition_index {
            Some(t_idx) => {
                let transition = &transitions[t_idx];
                let window_end = left.time_ms + transition.duration_ms as u64;
                if token_time_ms <= window_end {
                    let raw_progress = if transition.duration_ms == 0 {
                        1.0
                    } else {
                        (token_time_ms - left.time_ms) as f32 / transition.duration_ms as f32
                    };
                    let progress = raw_progress.clamp(0.0, 1.0);
                    let eased = curves::ease(
                        transition.curve,
                        progress,
                        transition.control_points,
                    );
                    let kind = if progress >= 0.5 {
                        transition.to.kind
                    } else {
                        transition.from.kind
                    };
                    let intensity =
                        curves::lerp(transition.from.intensity, transition.to.intensity, eased);
                    (
                        EmotionProfile::new(kind, intensity),
                        true,
                        Some(progress),
                    )
                } else {
                    (left.emotion.clone(), false, None)
                }
            }
            None => (left.emotion.clone(), false, None),
        };

        segments.push(EmotionSegment {
            start_ms: token_time_ms,
            end_ms,
            text: token.text.clone(),
            emotion,
            is_transition,
            progress,
        });
    }

    EmotionTimelineResult {
        keyframes,
        segments,
        total_duration_ms,
        transition_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::transition::{Curve, Trigger};
    use crate::model::voice::EmotionKind;

    fn transition(
        from_kind: EmotionKind,
        from_i: f32,
        to_kind: EmotionKind,
        to_i: f32,
        duration_ms: u32,
        trigger: Trigger,
    ) -> EmotionTransition {
        EmotionTransition {
            from: EmotionProfile::new(from_kind, from_i),
            to: EmotionProfile::new(to_kind, to_i),
            duration_ms,
            curve: Curve::EaseInOut,
            control_points: None,
            trigger,
        }
    }

    #[test]
    fn first_keyframe_is_always_at_zero() {
        let result = build_timeline(
            "hello world",
            &EmotionProfile::neutral(),
            &[],
            DEFAULT_MIN_TRANSITION_DURATION_MS,
            DEFAULT_MAX_TRANSITION_DURATION_MS,
            DEFAULT_INTENSITY_THRESHOLD,
        );
        assert_eq!(result.keyframes[0].time_ms, 0);
    }

    #[test]
    fn keyframes_are_sorted_by_time() {
        let text = "I was calm, but then I became really excited!";
        let t = transition(
            EmotionKind::Calm,
            0.6,
            EmotionKind::Excited,
            0.9,
            1500,
            Trigger::Word("excited".to_string()),
        );
        let result = build_timeline(
            text,
            &EmotionProfile::neutral(),
            std::slice::from_ref(&t),
            DEFAULT_MIN_TRANSITION_DURATION_MS,
            DEFAULT_MAX_TRANSITION_DURATION_MS,
            DEFAULT_INTENSITY_THRESHOLD,
        );
        let mut prev = 0;
        for kf in &result.keyframes {
            assert!(kf.time_ms >= prev);
            prev = kf.time_ms;
        }
        assert!(result.keyframes.len() >= 3);
        assert_eq!(result.transition_count, 1);
    }

    #[test]
    fn segment_count_equals_word_count() {
        let text = "I was calm, but then I became really excited!";
        let t = transition(
            EmotionKind::Calm,
            0.6,
            EmotionKind::Excited,
            0.9,
            1500,
            Trigger::Word("excited".to_string()),
        );
        let result = build_timeline(
            text,
            &EmotionProfile::neutral(),
            std::slice::from_ref(&t),
            DEFAULT_MIN_TRANSITION_DURATION_MS,
            DEFAULT_MAX_TRANSITION_DURATION_MS,
            DEFAULT_INTENSITY_THRESHOLD,
        );
        assert_eq!(result.segments.len(), text.split_whitespace().count());
    }

    #[test]
    fn invalid_transition_is_dropped() {
        // Duration below the minimum is rejected.
        let t = transition(
            EmotionKind::Calm,
            0.6,
            EmotionKind::Excited,
            0.9,
            100,
            Trigger::Word("excited".to_string()),
        );
        let result = build_timeline(
            "I am excited now",
            &EmotionProfile::neutral(),
            std::slice::from_ref(&t),
            DEFAULT_MIN_TRANSITION_DURATION_MS,
            DEFAULT_MAX_TRANSITION_DURATION_MS,
            DEFAULT_INTENSITY_THRESHOLD,
        );
        assert_eq!(result.transition_count, 0);
        assert_eq!(result.keyframes.len(), 1);
    }

    #[test]
    fn segment_progress_is_within_unit_interval() {
        let text = "I was calm, but then I became really excited!";
        let t = transition(
            EmotionKind::Calm,
            0.6,
            EmotionKind::Excited,
            0.9,
            1500,
            Trigger::Word("excited".to_string()),
        );
        let result = build_timeline(
            text,
            &EmotionProfile::neutral(),
            std::slice::from_ref(&t),
            DEFAULT_MIN_TRANSITION_DURATION_MS,
            DEFAULT_MAX_TRANSITION_DURATION_MS,
            DEFAULT_INTENSITY_THRESHOLD,
        );
        for s in &result.segments {
            if s.is_transition {
                let p = s.progress.expect("transition segment has progress");
                assert!((0.0..=1.0).contains(&p));
            }
            assert!((0.0..=1.0).contains(&s.emotion.intensity));
        }
    }
}
