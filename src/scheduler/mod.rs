//! Conversation Scheduler (spec.md §4.6): per-line timing, overlap
//! resolution, per-character track assembly. Grounded on
//! `mcp-muse::midi::player`'s absolute-time-from-relative-duration
//! computation, generalized from tempo-relative note timing to
//! pause/duration-relative line timing, and on the pack's `voice-mixer.rs`
//! per-speaker bookkeeping generalized to per-character tracks.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::emotion::timeline::WORDS_PER_MINUTE;
use crate::engine::VoiceEngine;
use crate::error::PipelineError;
use crate::model::line::Line;
use crate::model::pcm::PcmBuffer;
use crate::model::plan::RenderPlan;
use crate::model::track::{
    AudioSegment, CharacterTrack, ConversationTimeline, EventKind, RenderResult,
    RenderStatistics, TimelineEvent,
};
use crate::model::voice::EmotionProfile;

/// A line's resolved position on the master timeline (spec.md §4.6 step 2).
#[derive(Debug, Clone, Copy)]
struct LineSchedule {
    start_ms: u64,
    end_ms: u64,
}

/// Words-per-second derived from the shared 180 wpm constant, used for
/// `natural_duration_ms` (spec.md §4.6 step 2).
fn words_per_second() -> f64 {
    WORDS_PER_MINUTE / 60.0
}

fn natural_duration_ms(word_count: usize) -> u64 {
    ((word_count as f64 / words_per_second()) * 1000.0).round() as u64
}

/// Computes `start_ms`/`end_ms` for every line, in plan order (spec.md §4.6
/// step 2). `RenderPlan::validate` rejects any overlap whose target does not
/// precede the overlapping line in plan order, so a single forward pass
/// always finds the target already scheduled by the time it is needed.
fn compute_line_timings(plan: &RenderPlan) -> HashMap<String, LineSchedule> {
    let mut schedules: HashMap<String, LineSchedule> = HashMap::new();
    let mut cursor: u64 = 0;

    for (i, line) in plan.lines.iter().enumerate() {
        let speed = line.timing.speed_multiplier.unwrap_or(1.0);
        let duration_ms =
            (natural_duration_ms(line.word_count()) as f64 / speed as f64).round() as u64;

        let pause_before = line.timing.pause_before_ms.unwrap_or(if i == 0 {
            0
        } else {
            plan.global_settings.pause_between_lines_ms
        });

        let computed_start = line.timing.start_ms.unwrap_or(cursor + pause_before);
        let computed_end = line.timing.end_ms.unwrap_or(computed_start + duration_ms);

        // Advance the cursor from the non-overlapping computation regardless
        // of whether this line ends up overlap-positioned (spec.md §9 Open
        // Question: overlap targeting uses `target.start_ms + offset`, not
        // `target.end_ms`, so the target's own schedule is unaffected by
        // whether something later overlaps it).
        cursor = computed_end + line.timing.pause_after_ms;

        let (start_ms, end_ms) = match &line.timing.overlap {
            Some(overlap) => {
                let target = schedules.get(&overlap.target_line_id).copied().expect(
                    "validated plan guarantees the overlap target precedes and was already scheduled",
                );
                let start_ms = target.start_ms + overlap.offset_into_target_ms;
                let end_ms = start_ms + duration_ms;
                (start_ms, end_ms)
            }
            None => (computed_start, computed_end),
        };

        schedules.insert(line.id.clone(), LineSchedule { start_ms, end_ms });
    }

    schedules
}

fn group_lines_by_character<'a>(plan: &'a RenderPlan) -> Vec<(&'a str, Vec<&'a Line>)> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Line>> = HashMap::new();
    for line in &plan.lines {
        let cid = line.character_id.as_str();
        if !groups.contains_key(cid) {
            order.push(cid);
        }
        groups.entry(cid).or_default().push(line);
    }
    order
        .into_iter()
        .map(|cid| (cid, groups.remove(cid).unwrap_or_default()))
        .collect()
}

fn push_emotion_change_events(
    timeline: &mut ConversationTimeline,
    line: &Line,
    schedule: LineSchedule,
    synthesis: &crate::engine::LineSynthesis,
) {
    let mut last_kind = None;
    for segment in &synthesis.timeline.segments {
        if last_kind != Some(segment.emotion.kind) {
            timeline.push(TimelineEvent {
                time_ms: schedule.start_ms + segment.start_ms,
                kind: EventKind::EmotionChange,
                line_id: Some(line.id.clone()),
                character_id: Some(line.character_id.clone()),
                emotion: Some(segment.emotion.kind),
            });
            last_kind = Some(segment.emotion.kind);
        }
    }
}

/// Runs the full scheduler: validate, time, group, synthesize, assemble,
/// build the event log, compute statistics (spec.md §4.6). Does not invoke
/// the Audio Mixer; `RenderResult.master` is left `None` here, filled in by
/// a caller that chains into `mixer::mix` (spec.md §2 data flow: the
/// scheduler hands tracks + timeline to the mixer, it does not own it).
pub async fn run(
    plan: &RenderPlan,
    engine: &VoiceEngine,
    cancel: CancellationToken,
) -> Result<RenderResult, PipelineError> {
    plan.validate()?;

    let schedules = compute_line_timings(plan);
    let groups = group_lines_by_character(plan);

    let mut timeline = ConversationTimeline::default();
    let mut tracks = Vec::with_capacity(groups.len());
    let mut emotion_distribution: HashMap<crate::model::voice::EmotionKind, u32> = HashMap::new();
    let mut overlapping_line_count = 0u32;
    let mut failed_segments = 0u32;
    let mut total_ms = 0u64;

    for (character_id, lines) in groups {
        let character = plan
            .character(character_id)
            .expect("validated plan guarantees every line's character exists");

        let mut segments = Vec::with_capacity(lines.len());
        let mut track_buffers = Vec::with_capacity(lines.len());

        for line in lines {
            let schedule = *schedules
                .get(&line.id)
                .expect("every line was scheduled in compute_line_timings");
            total_ms = total_ms.max(schedule.end_ms);

            let default_emotion = line
                .emotion
                .clone()
                .unwrap_or_else(|| character.default_emotion.clone());
            *emotion_distribution.entry(default_emotion.kind).or_insert(0) += 1;

            let mut character_for_line = character.clone();
            character_for_line.default_emotion = default_emotion;

            let synthesis = engine
                .synthesize_line(
                    &character_for_line,
                    &line.text,
                    &line.transitions,
                    None,
                    cancel.clone(),
                )
                .await?;
            failed_segments += synthesis.failed_segments;

            timeline.push(TimelineEvent {
                time_ms: schedule.start_ms,
                kind: EventKind::LineStart,
                line_id: Some(line.id.clone()),
                character_id: Some(character_id.to_string()),
                emotion: None,
            });
            timeline.push(TimelineEvent {
                time_ms: schedule.end_ms,
                kind: EventKind::LineEnd,
                line_id: Some(line.id.clone()),
                character_id: Some(character_id.to_string()),
                emotion: None,
            });
            push_emotion_change_events(&mut timeline, line, schedule, &synthesis);

            if let Some(overlap) = &line.timing.overlap {
                overlapping_line_count += 1;
                let overlap_start = schedule.start_ms;
                let overlap_end = schedule.start_ms + overlap.overlap_duration_ms;
                total_ms = total_ms.max(overlap_end);
                timeline.push(TimelineEvent {
                    time_ms: overlap_start,
                    kind: EventKind::OverlapStart,
                    line_id: Some(line.id.clone()),
                    character_id: Some(overlap.target_line_id.clone()),
                    emotion: None,
                });
                timeline.push(TimelineEvent {
                    time_ms: overlap_end,
                    kind: EventKind::OverlapEnd,
                    line_id: Some(line.id.clone()),
                    character_id: Some(overlap.target_line_id.clone()),
                    emotion: None,
                });
            }

            segments.push(AudioSegment {
                line_id: line.id.clone(),
                start_ms: schedule.start_ms,
                end_ms: schedule.end_ms,
                pcm: synthesis.pcm.clone(),
            });
            track_buffers.push(synthesis.pcm);
        }

        let pcm = PcmBuffer::concat(&track_buffers);
        tracks.push(CharacterTrack {
            character_id: character_id.to_string(),
            segments,
            pcm,
        });
    }

    timeline.sort();
    timeline.total_ms = total_ms;

    let mut speaking_time_ms: HashMap<String, u64> = HashMap::new();
    for track in &tracks {
        let total: u64 = track
            .segments
            .iter()
            .map(|s| s.end_ms.saturating_sub(s.start_ms))
            .sum();
        speaking_time_ms.insert(track.character_id.clone(), total);
    }
    timeline.speaking_time_ms = speaking_time_ms.clone();

    let total_speaking: u64 = speaking_time_ms.values().sum();
    let silence_ms = total_ms.saturating_sub(total_speaking);

    let statistics = RenderStatistics {
        total_ms,
        speaking_time_ms,
        emotion_distribution,
        overlapping_line_count,
        silence_ms,
        failed_segments,
    };

    Ok(RenderResult {
        tracks,
        timeline,
        statistics,
        master: None,
    })
}

/// Convenience accessor mirroring spec.md §4.8's capability query surface,
/// used by callers that only have a `RenderResult` and want the line's
/// nominal emotion without re-deriving it.
pub fn line_default_emotion(line: &Line, character_default: &EmotionProfile) -> EmotionProfile {
    line.emotion.clone().unwrap_or_else(|| character_default.clone())
}
