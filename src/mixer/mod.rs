//! Audio Mixer (spec.md §4.7): sample-accurate 16-bit PCM summation,
//! normalization, compression, crossfades. Grounded directly on the pack's
//! per-speaker `i16` summation and saturating clamp pattern
//! (`voice-mixer.rs`), generalized from mix-minus conferencing to timeline
//! placement with normalization, compression and crossfades.
//!
//! The mixer is a pure function of its inputs (spec.md §4.7 Determinism):
//! given the same tracks, timeline and options it always produces the same
//! bytes.

use serde::{Deserialize, Serialize};

use crate::model::pcm::{PcmBuffer, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};
use crate::model::plan::RenderPlan;
use crate::model::track::{CharacterTrack, ConversationTimeline, EventKind};

/// Explicit, validated mixer configuration (spec.md §9 redesign note:
/// replace sentinel-defaulted options bags with an enumerated struct).
/// `spatial` is accepted but not yet acted on — the fixed effect chain this
/// crate implements is normalize/compress/crossfade only, per spec.md §1's
/// non-goal that the mixer is not a full effects DAW.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MixerOptions {
    pub normalize: bool,
    /// `0.0` disables compression; otherwise must lie in `(0, 1]`.
    pub compression_level: f32,
    pub crossfade_ms: u32,
    pub spatial: bool,
}

impl Default for MixerOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            compression_level: 0.0,
            crossfade_ms: 0,
            spatial: false,
        }
    }
}

impl MixerOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.compression_level < 0.0 || self.compression_level > 1.0 {
            return Err(format!(
                "compression_level {} outside [0,1]",
                self.compression_level
            ));
        }
        Ok(())
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// `32767 * 0.95`, the normalization ceiling (spec.md §4.7, §8).
fn normalization_ceiling() -> f32 {
    i16::MAX as f32 * 0.95
}

struct LineBounds {
    line_id: String,
    character_id: String,
    start_ms: u64,
    end_ms: u64,
}

fn line_bounds(timeline: &ConversationTimeline) -> Vec<LineBounds> {
    let mut bounds: Vec<LineBounds> = Vec::new();
    for event in &timeline.events {
        let Some(line_id) = &event.line_id else {
            continue;
        };
        let character_id = event.character_id.clone().unwrap_or_default();
        match event.kind {
            EventKind::LineStart => bounds.push(LineBounds {
                line_id: line_id.clone(),
                character_id,
                start_ms: event.time_ms,
                end_ms: event.time_ms,
            }),
            EventKind::LineEnd => {
                if let Some(b) = bounds.iter_mut().find(|b| &b.line_id == line_id) {
                    b.end_ms = event.time_ms;
                }
            }
            _ => {}
        }
    }
    bounds
}

/// Attenuation to apply to a target line's segment while it is inside an
/// overlap window (spec.md §4.7 "Per-track placement"). The timeline's
/// `overlap_start`/`overlap_end` events only carry time/line/character ids,
/// not the attenuation magnitude, so this looks the originating line's
/// `Overlap` up in the plan directly.
fn overlap_attenuation_for(
    plan: &RenderPlan,
    bounds: &[LineBounds],
    target_line_id: &str,
    start_ms: u64,
    end_ms: u64,
) -> f32 {
    let mut attenuation = 1.0f32;
    for line in &plan.lines {
        let Some(overlap) = &line.timing.overlap else {
            continue;
        };
        if overlap.target_line_id != target_line_id {
            continue;
        }
        // Overlap window on the master timeline: [overlapping_line.start_ms,
        // + overlap_duration_ms). The overlapping line's own start_ms is
        // recorded on the target's line_start event via the scheduler
        // (spec.md §4.6 step 2).
        if let Some(b) = bounds.iter().find(|b| b.line_id == line.id) {
            let window_start = b.start_ms;
            let window_end = window_start + overlap.overlap_duration_ms;
            if start_ms < window_end && end_ms > window_start {
                attenuation = attenuation.min(1.0 - overlap.volume_attenuation);
            }
        }
    }
    attenuation
}

/// Places every track's segments onto a zeroed master buffer at their
/// scheduled sample offsets, summing with saturating clamp (spec.md §4.7
/// "Master buffer sizing", "Per-track placement").
fn place_tracks(tracks: &[CharacterTrack], timeline: &ConversationTimeline, plan: &RenderPlan) -> Vec<i16> {
    let sample_rate = CANONICAL_SAMPLE_RATE;
    let total_samples = ((timeline.total_ms as f64 / 1000.0) * sample_rate as f64).ceil() as usize;
    let mut master = vec![0i16; total_samples * CANONICAL_CHANNELS as usize];

    let bounds = line_bounds(timeline);

    for track in tracks {
        for segment in &track.segments {
            let pcm = segment.pcm.mono_to_stereo();
            let start_sample = ((segment.start_ms as f64 / 1000.0) * sample_rate as f64).floor() as usize;
            let segment_frames = pcm.frame_count();

            let overlap_window = bounds
                .iter()
                .find(|b| b.line_id == segment.line_id)
                .map(|b| (b.start_ms, b.end_ms));
            let attenuation = match overlap_window {
                Some((s, e)) => overlap_attenuation_for(plan, &bounds, &segment.line_id, s, e),
                None => 1.0,
            };

            let max_frames = total_samples.saturating_sub(start_sample);
            let frames_to_copy = segment_frames.min(max_frames);

            for i in 0..frames_to_copy {
                for c in 0..CANONICAL_CHANNELS as usize {
                    let master_idx = (start_sample + i) * CANONICAL_CHANNELS as usize + c;
                    let sample = pcm.samples[i * CANONICAL_CHANNELS as usize + c];
                    let attenuated = (sample as f32 * attenuation).round() as i32;
                    master[master_idx] = clamp_i16(master[master_idx] as i32 + attenuated);
                }
            }
        }
    }

    master
}

/// Finds the peak absolute sample across the master buffer and, if
/// non-zero, scales every sample so the peak lands at `32767 * 0.95`
/// (spec.md §4.7 "Normalization").
fn normalize(master: &mut [i16]) {
    let peak = master.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    if peak == 0 {
        return;
    }
    let factor = (normalization_ceiling() / peak as f32).min(1.0);
    for sample in master.iter_mut() {
        *sample = clamp_i16((*sample as f32 * factor).round() as i32);
    }
}

/// Soft-knee-free compression: samples above `threshold` are compressed by
/// `ratio`, everything else passes through unchanged (spec.md §4.7
/// "Compression").
fn compress(master: &mut [i16], level: f32) {
    if level <= 0.0 {
        return;
    }
    let level = level.clamp(0.0, 1.0);
    let threshold = i16::MAX as f32 * (1.0 - level);
    let ratio = 1.0 + 3.0 * level;
    for sample in master.iter_mut() {
        let s = *sample as f32;
        let mag = s.abs();
        if mag > threshold {
            let compressed = threshold + (mag - threshold) / ratio;
            *sample = clamp_i16((s.signum() * compressed).round() as i32);
        }
    }
}

/// Raised-cosine crossfade envelope applied to the master around each
/// speaker-change boundary (spec.md §4.7 "Crossfades"): window of
/// `2*crossfade_ms` centered on the transition, applied to the master only.
fn apply_crossfades(master: &mut [i16], timeline: &ConversationTimeline, plan: &RenderPlan, crossfade_ms: u32) {
    if crossfade_ms == 0 {
        return;
    }
    let sample_rate = CANONICAL_SAMPLE_RATE as f64;
    let bounds = line_bounds(timeline);

    for pair in plan.lines.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.character_id == b.character_id {
            continue;
        }
        let Some(a_bounds) = bounds.iter().find(|bnd| bnd.line_id == a.id) else {
            continue;
        };
        let Some(b_bounds) = bounds.iter().find(|bnd| bnd.line_id == b.id) else {
            continue;
        };
        if b_bounds.start_ms < a_bounds.end_ms {
            // Overlapping, not a clean handoff; crossfading is for adjacent
            // speaker changes only.
            continue;
        }
        let center_ms = (a_bounds.end_ms + b_bounds.start_ms) / 2;
        let window_ms = crossfade_ms as u64;
        let window_start_ms = center_ms.saturating_sub(window_ms);
        let window_end_ms = center_ms + window_ms;

        let window_start_sample = ((window_start_ms as f64 / 1000.0) * sample_rate).floor() as usize;
        let window_end_sample = ((window_end_ms as f64 / 1000.0) * sample_rate).ceil() as usize;
        let total_frames = master.len() / CANONICAL_CHANNELS as usize;
        let window_end_sample = window_end_sample.min(total_frames);

        if window_start_sample >= window_end_sample {
            continue;
        }
        let span = (window_end_sample - window_start_sample).max(1) as f32;

        for frame in window_start_sample..window_end_sample {
            let progress = (frame - window_start_sample) as f32 / span;
            let envelope = 0.5 + 0.5 * (std::f32::consts::PI * progress).cos();
            for c in 0..CANONICAL_CHANNELS as usize {
                let idx = frame * CANONICAL_CHANNELS as usize + c;
                master[idx] = clamp_i16((master[idx] as f32 * envelope).round() as i32);
            }
        }
    }
}

/// Runs the mixer's fixed effect chain: place tracks, normalize, compress,
/// crossfade (spec.md §4.7). `plan` supplies the line order and overlap
/// declarations needed to resolve attenuation and speaker-change boundaries;
/// `timeline` supplies each line's scheduled bounds.
pub fn mix(
    plan: &RenderPlan,
    tracks: &[CharacterTrack],
    timeline: &ConversationTimeline,
    options: &MixerOptions,
) -> PcmBuffer {
    let mut master = place_tracks(tracks, timeline, plan);

    if options.normalize {
        normalize(&mut master);
    }
    if options.compression_level > 0.0 {
        compress(&mut master, options.compression_level);
    }
    if options.crossfade_ms > 0 {
        apply_crossfades(&mut master, timeline, plan, options.crossfade_ms);
    }

    PcmBuffer::new(CANONICAL_SAMPLE_RATE, CANONICAL_CHANNELS, master)
}
