//! Thin coordinator, not an algorithm in its own right (spec.md §4.8): for
//! a single request, resolve voice, compute the emotion timeline, build a
//! `SynthesisRequest` per segment, dispatch, concatenate, return.

use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::emotion::timeline::{self, EmotionTimelineResult};
use crate::model::character::Character;
use crate::model::pcm::PcmBuffer;
use crate::model::transition::EmotionTransition;
use crate::model::voice::{EmotionProfile, VoiceSpec};
use crate::provider::{
    self, FormatHint, Provider, SynthesisRequest, VoiceDescriptor, DEFAULT_TIMEOUT_MS,
};
use crate::ssml::{self, EmitOptions};
use crate::voice::prompt;

/// Either a fully-resolved voice or a raw prompt the engine must interpret
/// first (spec.md §4.8: "resolve voice via Prompt Interpreter if only a
/// prompt is given").
#[derive(Debug, Clone)]
pub enum VoiceSource {
    Resolved(VoiceSpec),
    Prompt(String),
}

pub fn resolve_voice(source: &VoiceSource) -> VoiceSpec {
    match source {
        VoiceSource::Resolved(spec) => spec.clone(),
        VoiceSource::Prompt(text) => prompt::interpret(text),
    }
}

/// Result of synthesizing one line's text through the full segment
/// pipeline: the concatenated PCM, the timeline that produced it, and a
/// count of segments that fell back to silence.
pub struct LineSynthesis {
    pub pcm: PcmBuffer,
    pub timeline: EmotionTimelineResult,
    pub failed_segments: u32,
}

pub struct VoiceEngine {
    providers: Vec<Box<dyn Provider>>,
    timeout_ms: u64,
    ssml_options: EmitOptions,
    /// `PipelineConfig::default_provider_order`: names tried, in order,
    /// after the capability check and before the stable-order fallback
    /// (spec.md §4.4 selection policy, as extended by `config::PipelineConfig`).
    provider_order: Vec<String>,
}

impl VoiceEngine {
    /// Runs `initialize` on each candidate provider, logging and excluding
    /// any that fail rather than aborting startup (spec.md §4.4 Failure
    /// semantics). Constructed once; read-only after construction (spec.md
    /// §5 Shared resources).
    pub async fn initialize(candidates: Vec<Box<dyn Provider>>) -> Self {
        let mut providers = Vec::new();
        for candidate in candidates {
            match candidate.initialize().await {
                Ok(()) => providers.push(candidate),
                Err(e) => {
                    tracing::warn!(
                        provider = candidate.name(),
                        error = %e,
                        "provider initialization failed; excluding from engine"
                    );
                }
            }
        }
        Self {
            providers,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            ssml_options: EmitOptions::default(),
            provider_order: Vec::new(),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_ssml_options(mut self, options: EmitOptions) -> Self {
        self.ssml_options = options;
        self
    }

    /// Installs `PipelineConfig::default_provider_order` (SPEC_FULL.md
    /// §1.1): consulted by `select_provider` between the capability match
    /// and the stable-order fallback.
    pub fn with_provider_order(mut self, provider_order: Vec<String>) -> Self {
        self.provider_order = provider_order;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn list_voices(&self) -> Vec<VoiceDescriptor> {
        self.providers.iter().flat_map(|p| p.list_voices()).collect()
    }

    pub fn supports_emotions(&self) -> bool {
        self.providers.iter().any(|p| p.supports_emotions())
    }

    pub fn supports_voice_cloning(&self) -> bool {
        self.providers.iter().any(|p| p.supports_voice_cloning())
    }

    /// Selection policy (spec.md §4.4, extended by `config::PipelineConfig`
    /// per SPEC_FULL.md §1.1): pre-resolved id first, else a capability
    /// match when emotion control is needed, else the first registered name
    /// found in `default_provider_order`, else the first registered
    /// provider; `NoProviderAvailable` when nothing qualifies.
    fn select_provider(
        &self,
        preferred_id: Option<&str>,
        needs_emotion: bool,
    ) -> Result<&dyn Provider, PipelineError> {
        if let Some(id) = preferred_id {
            if let Some(p) = self.providers.iter().find(|p| p.name() == id) {
                return Ok(p.as_ref());
            }
        }
        if needs_emotion {
            if let Some(p) = self.providers.iter().find(|p| p.supports_emotions()) {
                return Ok(p.as_ref());
            }
        }
        for name in &self.provider_order {
            if let Some(p) = self.providers.iter().find(|p| p.name() == name) {
                return Ok(p.as_ref());
            }
        }
        self.providers
            .first()
            .map(|p| p.as_ref())
            .ok_or(PipelineError::NoProviderAvailable)
    }

    /// Synthesizes one line's full text: builds the emotion timeline,
    /// dispatches one `SynthesisRequest` per segment, concatenates in
    /// segment order (spec.md §4.8, §5 Ordering guarantees). A segment whose
    /// provider call fails falls back to a zero-filled buffer of its
    /// estimated duration and increments `failed_segments`; a structural
    /// failure (`NoProviderAvailable`) aborts the whole line.
    pub async fn synthesize_line(
        &self,
        character: &Character,
        text: &str,
        transitions: &[EmotionTransition],
        preferred_provider_id: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<LineSynthesis, PipelineError> {
        let timeline = timeline::build_timeline(
            text,
            &character.default_emotion,
            transitions,
            crate::model::transition::MIN_TRANSITION_DURATION_MS,
            crate::model::transition::MAX_TRANSITION_DURATION_MS,
            crate::model::transition::DEFAULT_INTENSITY_THRESHOLD,
        );

        let needs_emotion = timeline.transition_count > 0;
        let provider = self.select_provider(preferred_provider_id, needs_emotion)?;

        let mut buffers = Vec::with_capacity(timeline.segments.len());
        let mut failed_segments = 0u32;

        for segment in &timeline.segments {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            let request = self.build_request(provider, character, segment);

            match provider::synthesize_with_timeout(
                provider,
                request,
                cancel.clone(),
                self.timeout_ms,
            )
            .await
            {
                Ok(pcm) => buffers.push(pcm),
                Err(PipelineError::Cancelled) => return Err(PipelineError::Cancelled),
                Err(e) => {
                    tracing::warn!(error = %e, "segment synthesis failed, substituting silence");
                    failed_segments += 1;
                    let duration_ms = segment.end_ms.saturating_sub(segment.start_ms).max(1);
                    buffers.push(PcmBuffer::silence(duration_ms));
                }
            }
        }

        Ok(LineSynthesis {
            pcm: PcmBuffer::concat(&buffers),
            timeline,
            failed_segments,
        })
    }

    fn build_request(
        &self,
        provider: &dyn Provider,
        character: &Character,
        segment: &crate::emotion::EmotionSegment,
    ) -> SynthesisRequest {
        let voice_id = provider
            .list_voices()
            .first()
            .map(|v| v.id.clone())
            .unwrap_or_else(|| "default".to_string());

        let (rate, pitch, volume) = if provider.supports_emotions() {
            (1.0, 0.0, 0.0)
        } else {
            provider::collapse_emotion_to_numeric(&segment.emotion)
        };

        let ssml = if provider.supports_emotions() {
            Some(ssml::emit(
                &segment.text,
                character,
                &segment.emotion,
                &self.ssml_options,
            ))
        } else {
            None
        };

        SynthesisRequest {
            text: segment.text.clone(),
            ssml,
            voice_id,
            emotion: Some(segment.emotion.clone()),
            rate,
            pitch,
            volume,
            format_hint: FormatHint::Pcm,
        }
    }

    /// Independent batch synthesis: each request stands alone, a failure at
    /// index `i` yields `None` at index `i` rather than aborting the batch
    /// (spec.md §4.8 "For batch").
    pub async fn synthesize_batch(
        &self,
        requests: Vec<(Character, String, Vec<EmotionTransition>)>,
    ) -> Vec<Option<LineSynthesis>> {
        let mut handles = Vec::with_capacity(requests.len());
        for (character, text, transitions) in requests {
            let result = self
                .synthesize_line(&character, &text, &transitions, None, CancellationToken::new())
                .await;
            handles.push(result.ok());
        }
        handles
    }

    pub fn default_emotion_profile(&self) -> EmotionProfile {
        EmotionProfile::neutral()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::voice::VoiceSpec;
    use crate::provider::{BasicProvider, EmotiveProvider};

    fn character() -> Character {
        Character::new("c1", "Narrator", VoiceSpec::default())
    }

    #[tokio::test]
    async fn selects_emotive_provider_when_transitions_present() {
        let engine = VoiceEngine::initialize(vec![
            Box::new(BasicProvider::new()),
            Box::new(EmotiveProvider::new()),
        ])
        .await;
        assert_eq!(engine.provider_names(), vec!["reference-basic", "reference-emotive"]);
    }

    #[tokio::test]
    async fn synthesize_line_produces_nonempty_pcm() {
        let engine = VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
        let result = engine
            .synthesize_line(
                &character(),
                "hello there friend",
                &[],
                None,
                CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(!result.pcm.samples.is_empty());
        assert_eq!(result.failed_segments, 0);
    }

    #[tokio::test]
    async fn no_provider_available_is_fatal() {
        let engine = VoiceEngine::initialize(vec![]).await;
        let result = engine
            .synthesize_line(&character(), "hello", &[], None, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(PipelineError::NoProviderAvailable)));
    }

    #[tokio::test]
    async fn default_provider_order_is_consulted_before_stable_fallback() {
        let engine = VoiceEngine::initialize(vec![
            Box::new(BasicProvider::new()),
            Box::new(EmotiveProvider::new()),
        ])
        .await
        .with_provider_order(vec!["reference-emotive".to_string()]);

        // The stable fallback alone would pick "reference-basic"
        // (registered first); default_provider_order names
        // "reference-emotive" instead.
        let selected = engine.select_provider(None, false).unwrap();
        assert_eq!(selected.name(), "reference-emotive");
    }

    #[tokio::test]
    async fn cancellation_is_distinct_from_synthesis_failure() {
        let engine = VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine
            .synthesize_line(&character(), "hello there friend", &[], None, cancel)
            .await;
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }
}
