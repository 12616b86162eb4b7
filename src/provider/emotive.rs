//! Reference emotion-capable backend (spec.md §6: "an emotion-capable
//! backend that accepts emotion directly"). Concrete TTS backends are out
//! of scope for the core; this one exists so the provider trait boundary
//! has at least one exerciseable implementation, generating a deterministic
//! synthetic tone rather than calling a remote service.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::model::pcm::{PcmBuffer, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};
use crate::model::voice::{AgeRange, Gender};

use super::{Provider, SynthesisRequest, VoiceDescriptor};

/// Milliseconds of synthesized audio per character of input text, the same
/// order of magnitude as the 15 chars/second constant used elsewhere in the
/// pipeline for duration estimation.
const MS_PER_CHAR: f64 = 1000.0 / 15.0;

pub struct EmotiveProvider {
    name: String,
}

impl EmotiveProvider {
    pub fn new() -> Self {
        Self {
            name: "reference-emotive".to_string(),
        }
    }
}

impl Default for EmotiveProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn synthesize_tone(text: &str, rate: f32, pitch: f32) -> PcmBuffer {
    let duration_ms = (text.chars().count() as f64 * MS_PER_CHAR / rate.max(0.1) as f64).max(1.0);
    let frames = ((duration_ms / 1000.0) * CANONICAL_SAMPLE_RATE as f64) as usize;
    let base_freq = 220.0 * 2f32.powf(pitch / 1200.0);
    let mut samples = Vec::with_capacity(frames * CANONICAL_CHANNELS as usize);
    for n in 0..frames {
        let t = n as f32 / CANONICAL_SAMPLE_RATE as f32;
        let sample = (t * base_freq * std::f32::consts::TAU).sin() * 0.3;
        let value = (sample * i16::MAX as f32) as i16;
        samples.push(value);
        samples.push(value);
    }
    PcmBuffer::new(CANONICAL_SAMPLE_RATE, CANONICAL_CHANNELS, samples)
}

#[async_trait]
impl Provider for EmotiveProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), PipelineError> {
        Ok(())
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        vec![VoiceDescriptor {
            id: "emotive-default".to_string(),
            name: "Reference Emotive Voice".to_string(),
            gender: Gender::Neutral,
            age: AgeRange::Adult,
            language: "en-US".to_string(),
        }]
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
        _cancel: CancellationToken,
    ) -> Result<PcmBuffer, PipelineError> {
        Ok(synthesize_tone(&request.text, request.rate, request.pitch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FormatHint;

    #[tokio::test]
    async fn synthesize_returns_nonempty_canonical_pcm() {
        let provider = EmotiveProvider::new();
        let request = SynthesisRequest {
            text: "hello there".to_string(),
            ssml: None,
            voice_id: "emotive-default".to_string(),
            emotion: None,
            rate: 1.0,
            pitch: 0.0,
            volume: 0.0,
            format_hint: FormatHint::Pcm,
        };
        let pcm = provider
            .synthesize(request, CancellationToken::new())
            .await
            .unwrap();
        assert!(!pcm.samples.is_empty());
        assert!(pcm.is_canonical());
    }
}
