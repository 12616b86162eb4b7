//! Synthesis pipeline that renders annotated dialogue into synchronized,
//! multi-character speech audio (spec.md §1). The library crate never
//! installs its own `tracing` subscriber — only the `voxline` binary does
//! — so it can be embedded in a host process that owns its own subscriber
//! (SPEC_FULL.md §1.1).

pub mod codec;
pub mod config;
pub mod emotion;
pub mod engine;
pub mod error;
pub mod mixer;
pub mod model;
pub mod provider;
pub mod scene;
pub mod scheduler;
pub mod script;
pub mod server;
pub mod setup;
pub mod ssml;
pub mod subtitle;
pub mod voice;

use tokio_util::sync::CancellationToken;

use error::PipelineError;
use mixer::MixerOptions;
use model::plan::RenderPlan;
use model::track::RenderResult;

/// Runs the full pipeline for one `RenderPlan` (spec.md §2 data flow): the
/// Conversation Scheduler produces per-character tracks and the event
/// timeline, then the Audio Mixer places them on a master buffer. This is
/// the crate's single entry point gluing the two top-level components
/// together; neither owns the other (spec.md §9 redesign note on breaking
/// the scheduler/engine cycle).
pub async fn render(
    plan: &RenderPlan,
    engine: &engine::VoiceEngine,
    mixer_options: &MixerOptions,
    cancel: CancellationToken,
) -> Result<RenderResult, PipelineError> {
    mixer_options
        .validate()
        .map_err(|reason| PipelineError::InvalidPlan { reason })?;

    let mut result = scheduler::run(plan, engine, cancel).await?;
    let master = mixer::mix(plan, &result.tracks, &result.timeline, mixer_options);
    result.master = Some(master);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::character::Character;
    use model::line::{Line, LineTiming};
    use model::plan::GlobalSettings;
    use model::voice::VoiceSpec;
    use provider::EmotiveProvider;

    #[tokio::test]
    async fn end_to_end_render_produces_a_master_buffer() {
        let plan = RenderPlan {
            characters: vec![Character::new("a", "Alice", VoiceSpec::default())],
            lines: vec![Line {
                id: "l1".into(),
                character_id: "a".into(),
                text: "hello there friend".into(),
                emotion: None,
                transitions: Vec::new(),
                timing: LineTiming::default(),
                audio_effects: Vec::new(),
            }],
            global_settings: GlobalSettings::default(),
            metadata: Default::default(),
        };
        let engine = engine::VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
        let result = render(
            &plan,
            &engine,
            &MixerOptions::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(result.master.is_some());
        assert_eq!(result.statistics.failed_segments, 0);
    }

    #[tokio::test]
    async fn empty_plan_renders_zero_duration_master() {
        let plan = RenderPlan {
            characters: Vec::new(),
            lines: Vec::new(),
            global_settings: GlobalSettings::default(),
            metadata: Default::default(),
        };
        let engine = engine::VoiceEngine::initialize(vec![Box::new(EmotiveProvider::new())]).await;
        let result = render(
            &plan,
            &engine,
            &MixerOptions::default(),
            CancellationToken::new(),
        )
        .await
        .unwrap();
        let master = result.master.unwrap();
        assert_eq!(master.samples.len(), 0);
    }
}
