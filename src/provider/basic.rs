//! Reference non-emotion backend (spec.md §6: "a non-emotion backend whose
//! emotion inputs are collapsed into rate/pitch/volume before dispatch").

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::model::pcm::{PcmBuffer, CANONICAL_CHANNELS, CANONICAL_SAMPLE_RATE};
use crate::model::voice::{AgeRange, Gender};

use super::{collapse_emotion_to_numeric, Provider, SynthesisRequest, VoiceDescriptor};

const MS_PER_CHAR: f64 = 1000.0 / 15.0;

pub struct BasicProvider {
    name: String,
}

impl BasicProvider {
    pub fn new() -> Self {
        Self {
            name: "reference-basic".to_string(),
        }
    }
}

impl Default for BasicProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn synthesize_tone(text: &str, rate: f32) -> PcmBuffer {
    let duration_ms = (text.chars().count() as f64 * MS_PER_CHAR / rate.max(0.1) as f64).max(1.0);
    let frames = ((duration_ms / 1000.0) * CANONICAL_SAMPLE_RATE as f64) as usize;
    let mut samples = Vec::with_capacity(frames * CANONICAL_CHANNELS as usize);
    for n in 0..frames {
        let t = n as f32 / CANONICAL_SAMPLE_RATE as f32;
        let sample = (t * 180.0 * std::f32::consts::TAU).sin() * 0.25;
        let value = (sample * i16::MAX as f32) as i16;
        samples.push(value);
        samples.push(value);
    }
    PcmBuffer::new(CANONICAL_SAMPLE_RATE, CANONICAL_CHANNELS, samples)
}

#[async_trait]
impl Provider for BasicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<(), PipelineError> {
        Ok(())
    }

    fn list_voices(&self) -> Vec<VoiceDescriptor> {
        vec![VoiceDescriptor {
            id: "basic-default".to_string(),
            name: "Reference Basic Voice".to_string(),
            gender: Gender::Neutral,
            age: AgeRange::Adult,
            language: "en-US".to_string(),
        }]
    }

    fn supports_emotions(&self) -> bool {
        false
    }

    fn supports_voice_cloning(&self) -> bool {
        false
    }

    async fn synthesize(
        &self,
        mut request: SynthesisRequest,
        _cancel: CancellationToken,
    ) -> Result<PcmBuffer, PipelineError> {
        if let Some(emotion) = &request.emotion {
            let (rate_delta, pitch_delta, volume_delta) = collapse_emotion_to_numeric(emotion);
            request.rate *= rate_delta;
            request.pitch += pitch_delta;
            request.volume += volume_delta;
        }
        Ok(synthesize_tone(&request.text, request.rate))
    }
}
