//! End-to-end scenarios (spec.md §8 "Concrete end-to-end scenarios"),
//! driving the library directly rather than spawning a child process, since
//! these are about pipeline semantics, not transport (mirrors the shape of
//! `tests/integration/mcp_protocol.rs` — black-box, one scenario per test —
//! without the stdio plumbing).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use voxline::emotion::timeline::build_timeline;
use voxline::engine::VoiceEngine;
use voxline::error::PipelineError;
use voxline::mixer::MixerOptions;
use voxline::model::character::Character;
use voxline::model::line::{Line, LineTiming, Overlap};
use voxline::model::pcm::PcmBuffer;
use voxline::model::plan::{GlobalSettings, RenderPlan};
use voxline::model::track::EventKind;
use voxline::model::transition::{Curve, EmotionTransition, Trigger, MAX_TRANSITION_DURATION_MS, MIN_TRANSITION_DURATION_MS, DEFAULT_INTENSITY_THRESHOLD};
use voxline::model::voice::{Accent, AgeRange, EmotionKind, EmotionProfile, Gender, PersonalityTag, Timbre, VoiceSpec};
use voxline::provider::{EmotiveProvider, Provider, SynthesisRequest, VoiceDescriptor};
use voxline::voice::prompt;

/// Scenario 1: prompt parsing.
#[test]
fn prompt_parsing_resolves_structured_voice_spec() {
    let spec = prompt::interpret("Young British female voice, cheerful and energetic, high pitch");

    assert_eq!(spec.gender, Gender::Female);
    assert_eq!(spec.age, AgeRange::Young);
    assert_eq!(spec.accent, Accent::British);
    assert_eq!(spec.timbre, Timbre::High);
    assert!(spec.personality.contains(&PersonalityTag::Cheerful));
    assert!(spec.personality.contains(&PersonalityTag::Energetic));
    assert_eq!(spec.default_emotion.kind, EmotionKind::Happy);
}

/// Scenario 2: single transition produces the expected keyframe/segment shape.
#[test]
fn single_transition_produces_expected_keyframes_and_segments() {
    let text = "I was calm, but then I became really excited!";
    let transition = EmotionTransition {
        from: EmotionProfile::new(EmotionKind::Calm, 0.6),
        to: EmotionProfile::new(EmotionKind::Excited, 0.9),
        duration_ms: 1500,
        curve: Curve::EaseInOut,
        control_points: None,
        trigger: Trigger::Word("excited".to_string()),
    };

    let result = build_timeline(
        text,
        &EmotionProfile::neutral(),
        &[transition],
        MIN_TRANSITION_DURATION_MS,
        MAX_TRANSITION_DURATION_MS,
        DEFAULT_INTENSITY_THRESHOLD,
    );

    assert_eq!(result.transition_count, 1);
    assert!(result.keyframes.len() >= 3);
    assert_eq!(result.keyframes[0].time_ms, 0);
    assert_eq!(result.segments.len(), text.split_whitespace().count());
}

fn character_with_emotion(id: &str, name: &str, emotion: EmotionProfile) -> Character {
    let mut character = Character::new(id, name, VoiceSpec::default());
    character.default_emotion = emotion;
    character
}

fn simple_line(id: &str, character_id: &str, text: &str) -> Line {
    Line {
        id: id.to_string(),
        character_id: character_id.to_string(),
        text: text.to_string(),
        emotion: None,
        transitions: Vec::new(),
        timing: LineTiming::default(),
        audio_effects: Vec::new(),
    }
}

/// Scenario 3: two-character scheduling with a fixed inter-line pause.
#[tokio::test]
async fn multi_character_scheduler_places_lines_in_order_with_pauses() {
    let plan = RenderPlan {
        characters: vec![
            character_with_emotion("a", "Alice", EmotionProfile::neutral()),
            character_with_emotion("b", "Bob", EmotionProfile::neutral()),
        ],
        lines: vec![
            simple_line("a1", "a", "one two three four five six seven eight nine ten eleven twelve"),
            simple_line("b1", "b", "one two three four five six seven eight"),
            simple_line("a2", "a", "one two three four five"),
        ],
        global_settings: GlobalSettings {
            pause_between_lines_ms: 500,
            ..GlobalSettings::default()
        },
        metadata: Default::default(),
    };

    let engine = VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
    let result = voxline::render(&plan, &engine, &MixerOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    let a1_start = event_time(&result.timeline, "a1", EventKind::LineStart);
    let a1_end = event_time(&result.timeline, "a1", EventKind::LineEnd);
    let b1_start = event_time(&result.timeline, "b1", EventKind::LineStart);
    let b1_end = event_time(&result.timeline, "b1", EventKind::LineEnd);
    let a2_start = event_time(&result.timeline, "a2", EventKind::LineStart);

    assert_eq!(a1_start, 0);
    assert!((a1_end as i64 - 4000).abs() <= 50, "a1_end={a1_end}");
    assert_eq!(b1_start, a1_end + 500);
    assert!((b1_end as i64 - (b1_start as i64 + 2667)).abs() <= 50, "b1_end={b1_end}");
    assert_eq!(a2_start, b1_end + 500);

    let track_a = result.tracks.iter().find(|t| t.character_id == "a").unwrap();
    let track_b = result.tracks.iter().find(|t| t.character_id == "b").unwrap();
    assert_eq!(track_b.total_samples(), track_b.pcm.samples.len());
    assert_eq!(track_a.segments.len(), 2);
}

fn event_time(timeline: &voxline::model::track::ConversationTimeline, line_id: &str, kind: EventKind) -> u64 {
    timeline
        .events
        .iter()
        .find(|e| e.line_id.as_deref() == Some(line_id) && e.kind == kind)
        .map(|e| e.time_ms)
        .unwrap_or_else(|| panic!("no {kind:?} event for line {line_id}"))
}

/// Scenario 4: overlap positions the overlapping line relative to the
/// target's start and attenuates the target's segment within the window.
#[tokio::test]
async fn overlap_attenuates_target_and_emits_overlap_events() {
    let mut plan = RenderPlan {
        characters: vec![
            character_with_emotion("a", "Alice", EmotionProfile::neutral()),
            character_with_emotion("b", "Bob", EmotionProfile::neutral()),
        ],
        lines: vec![
            simple_line("a1", "a", "one two three four five six seven eight nine ten eleven twelve"),
            simple_line("b1", "b", "one two three four five six seven eight"),
        ],
        global_settings: GlobalSettings::default(),
        metadata: Default::default(),
    };
    plan.lines[1].timing.overlap = Some(Overlap {
        target_line_id: "a1".to_string(),
        offset_into_target_ms: 1000,
        overlap_duration_ms: 2000,
        volume_attenuation: 0.3,
    });

    let engine = VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
    let result = voxline::render(&plan, &engine, &MixerOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    let a1_start = event_time(&result.timeline, "a1", EventKind::LineStart);
    let b1_start = event_time(&result.timeline, "b1", EventKind::LineStart);
    assert_eq!(b1_start, a1_start + 1000);

    let overlap_start = event_time(&result.timeline, "b1", EventKind::OverlapStart);
    let overlap_end = event_time(&result.timeline, "b1", EventKind::OverlapEnd);
    assert_eq!(overlap_start, 1000);
    assert_eq!(overlap_end, 3000);
    assert_eq!(result.statistics.overlapping_line_count, 1);
}

/// Scenario 5: SRT parse/emit round-trips modulo the stripped emotion tag.
#[test]
fn srt_round_trips_modulo_emotion_annotation() {
    let input = "1\n00:00:01,000 --> 00:00:03,000\nALICE: Hello [happy]!\n";
    let entries = voxline::subtitle::srt::parse(input);

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.index, Some(1));
    assert_eq!(entry.start_ms, Some(1000));
    assert_eq!(entry.end_ms, Some(3000));
    assert_eq!(entry.speaker.as_deref(), Some("ALICE"));
    assert_eq!(entry.text, "Hello !");
    assert_eq!(entry.emotion, Some(EmotionKind::Happy));

    let emitted = voxline::subtitle::srt::emit(&entries, false);
    assert_eq!(emitted.trim_end(), input.trim_end());
}

/// A provider that fails on any request whose text contains a marker word,
/// simulating scenario 6's "provider throws on the second line".
struct FlakyProvider {
    inner: EmotiveProvider,
}

impl FlakyProvider {
    fn new() -> Self {
        Self {
            inner: EmotiveProvider::new(),
        }
    }
}

#[async_trait]
impl Provider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky-test-provider"
    }

    async fn initialize(&self) -> Result<(), PipelineError> {
        Ok(())
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.inner.list_voices()
    }

    fn supports_emotions(&self) -> bool {
        true
    }

    fn supports_voice_cloning(&self) -> bool {
        false
    }

    async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: CancellationToken,
    ) -> Result<PcmBuffer, PipelineError> {
        if request.text.to_lowercase().contains("misfire") {
            return Err(PipelineError::SynthesisFailed {
                provider: self.name().to_string(),
                kind: voxline::error::SynthesisFailureKind::Backend,
            });
        }
        self.inner.synthesize(request, cancel).await
    }
}

/// Scenario 6: a non-fatal synthesis failure on one line leaves the rest of
/// the render intact, with the failed region silent and counted.
#[tokio::test]
async fn non_fatal_synthesis_failure_yields_silent_region_and_count() {
    let plan = RenderPlan {
        characters: vec![character_with_emotion("a", "Alice", EmotionProfile::neutral())],
        lines: vec![
            simple_line("l1", "a", "hello there friend"),
            simple_line("l2", "a", "misfire misfire misfire"),
        ],
        global_settings: GlobalSettings::default(),
        metadata: Default::default(),
    };

    let engine = VoiceEngine::initialize(vec![Box::new(FlakyProvider::new())]).await;
    let result = voxline::render(&plan, &engine, &MixerOptions::default(), CancellationToken::new())
        .await
        .unwrap();

    assert!(result.statistics.failed_segments >= 1, "at least the misfiring segment should be counted");
    assert!(result.master.is_some());
    assert_eq!(result.statistics.total_ms, result.timeline.total_ms);

    let l2_start = event_time(&result.timeline, "l2", EventKind::LineStart);
    let l2_end = event_time(&result.timeline, "l2", EventKind::LineEnd);
    let sample_rate = voxline::model::pcm::CANONICAL_SAMPLE_RATE as f64;
    let master = result.master.unwrap();
    let start_frame = ((l2_start as f64 / 1000.0) * sample_rate).floor() as usize;
    let end_frame = ((l2_end as f64 / 1000.0) * sample_rate).ceil() as usize;
    let channels = master.channel_count as usize;
    let region = &master.samples[(start_frame * channels).min(master.samples.len())
        ..(end_frame * channels).min(master.samples.len())];
    assert!(region.iter().all(|&s| s == 0), "failed line's region should be silent");
}
