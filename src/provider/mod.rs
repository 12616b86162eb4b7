//! Capability-negotiated synthesis backend (spec.md §4.4).
//!
//! Providers are values, not subclasses (spec.md §9 redesign note): the
//! engine owns a `Vec<Box<dyn Provider>>` and selects by capability rather
//! than walking a class hierarchy.

pub mod basic;
pub mod emotive;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{PipelineError, SynthesisFailureKind};
use crate::model::pcm::PcmBuffer;
use crate::model::voice::{AgeRange, EmotionProfile, Gender};

pub use basic::BasicProvider;
pub use emotive::EmotiveProvider;

#[derive(Debug, Clone)]
pub struct VoiceDescriptor {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub age: AgeRange,
    pub language: String,
}

/// Container format the caller would like the provider to return, when the
/// provider is capable of returning something other than raw PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Pcm,
    Wav,
}

/// Everything a provider needs to synthesize one segment (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub ssml: Option<String>,
    pub voice_id: String,
    pub emotion: Option<EmotionProfile>,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    pub format_hint: FormatHint,
}

/// Default per-request timeout (spec.md §5): 60 seconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// The capability trait every backend implements (spec.md §4.4 Contract).
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Explicit initialization step (spec.md §9: no global singletons, no
    /// implicit "initialized" flag). Failure here does not abort engine
    /// startup; the caller logs and excludes the provider.
    async fn initialize(&self) -> Result<(), PipelineError>;

    fn list_voices(&self) -> Vec<VoiceDescriptor>;

    fn supports_emotions(&self) -> bool;

    fn supports_voice_cloning(&self) -> bool;

    async fn synthesize(
        &self,
        request: SynthesisRequest,
        cancel: CancellationToken,
    ) -> Result<PcmBuffer, PipelineError>;
}

/// Runs `provider.synthesize` under the default timeout. A timeout maps to
/// the non-fatal `SynthesisFailed` taxonomy (spec.md §5 Timeouts, §7);
/// cancellation maps to `PipelineError::Cancelled`, a distinct outcome that
/// is neither success nor a synthesis failure (spec.md §5 Cancellation).
pub async fn synthesize_with_timeout(
    provider: &dyn Provider,
    request: SynthesisRequest,
    cancel: CancellationToken,
    timeout_ms: u64,
) -> Result<PcmBuffer, PipelineError> {
    let name = provider.name().to_string();
    tokio::select! {
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        result = tokio::time::timeout(
            std::time::Duration::from_millis(timeout_ms),
            provider.synthesize(request, cancel.clone()),
        ) => match result {
            Ok(inner) => inner,
            Err(_elapsed) => Err(PipelineError::SynthesisFailed {
                provider: name,
                kind: SynthesisFailureKind::Timeout,
            }),
        },
    }
}

/// Collapses an emotion into numeric rate/pitch/volume deltas for providers
/// that do not support emotion control directly (spec.md §4.4: "same
/// mapping as §4.3 but applied numerically, not as SSML").
pub fn collapse_emotion_to_numeric(emotion: &EmotionProfile) -> (f32, f32, f32) {
    use crate::model::voice::EmotionKind;
    let i = emotion.intensity;
    let (rate_mult, pitch_pct, _range_pct) = match emotion.kind {
        EmotionKind::Happy => (0.2, 15.0, 25.0),
        EmotionKind::Sad => (-0.3, -20.0, -15.0),
        EmotionKind::Angry => (0.15, 10.0, 30.0),
        EmotionKind::Excited => (0.25, 20.0, 30.0),
        EmotionKind::Calm => (-0.1, -5.0, -10.0),
        EmotionKind::Fearful => (0.1, 25.0, 10.0),
        EmotionKind::Surprised => (0.1, 30.0, 20.0),
        EmotionKind::Neutral => (0.0, 0.0, 0.0),
    };
    let rate = 1.0 + rate_mult * i;
    let pitch = pitch_pct * i;
    let volume = 0.0;
    (rate, pitch, volume)
}
