//! Scene-aware recommender (spec.md §2 component 11; supplemented per
//! SPEC_FULL.md §10.2): maps a supplied `SceneContext` to prosody/reverb/EQ
//! hints. A pure function from a closed-vocabulary context enum to a
//! struct of numeric hints, grounded on the pack's
//! `ProviderEmotionSupport`/capability-table style
//! (`emotion-mapper.rs`): a lookup table keyed by enum variants with a
//! documented neutral fallback for unmapped combinations.
//!
//! The core does not compute a `SceneContext` from video or audio (spec.md
//! §1 out-of-scope: "scene analysis recommender... consumes a supplied
//! `SceneContext`"); this module only consumes one.

use crate::model::scene::{Location, Mood, SceneContext, TimeOfDay};

/// Prosody nudge consumed by the SSML emitter: additive percentage offsets
/// layered on top of the emotion-driven prosody table (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProsodyHint {
    pub rate_pct: f32,
    pub pitch_pct: f32,
    pub volume_pct: f32,
}

impl ProsodyHint {
    const NEUTRAL: ProsodyHint = ProsodyHint {
        rate_pct: 0.0,
        pitch_pct: 0.0,
        volume_pct: 0.0,
    };
}

/// Reverb/EQ hint passed through to the Codec collaborator. Actual reverb
/// DSP is out of the mixer's fixed effect chain (spec.md §1), so this is a
/// description the codec/post-processor may act on, not applied here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientHint {
    pub reverb_wet: f32,
    pub low_shelf_db: f32,
    pub high_shelf_db: f32,
}

impl AmbientHint {
    const NEUTRAL: AmbientHint = AmbientHint {
        reverb_wet: 0.0,
        low_shelf_db: 0.0,
        high_shelf_db: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRecommendation {
    pub prosody: ProsodyHint,
    pub ambient: AmbientHint,
}

fn location_ambient(location: Location) -> AmbientHint {
    match location {
        Location::Indoor => AmbientHint {
            reverb_wet: 0.1,
            low_shelf_db: 0.0,
            high_shelf_db: 0.0,
        },
        Location::Outdoor => AmbientHint {
            reverb_wet: 0.02,
            low_shelf_db: -1.0,
            high_shelf_db: 1.0,
        },
        Location::Vehicle => AmbientHint {
            reverb_wet: 0.05,
            low_shelf_db: 2.0,
            high_shelf_db: -2.0,
        },
        Location::LargeHall => AmbientHint {
            reverb_wet: 0.4,
            low_shelf_db: 0.0,
            high_shelf_db: -1.0,
        },
        Location::SmallRoom => AmbientHint {
            reverb_wet: 0.15,
            low_shelf_db: 0.5,
            high_shelf_db: 0.0,
        },
    }
}

fn time_of_day_prosody(time_of_day: TimeOfDay) -> ProsodyHint {
    match time_of_day {
        TimeOfDay::Morning => ProsodyHint {
            rate_pct: 0.0,
            pitch_pct: 2.0,
            volume_pct: 0.0,
        },
        TimeOfDay::Day => ProsodyHint::NEUTRAL,
        TimeOfDay::Evening => ProsodyHint {
            rate_pct: -2.0,
            pitch_pct: 0.0,
            volume_pct: 0.0,
        },
        TimeOfDay::Night => ProsodyHint {
            rate_pct: -5.0,
            pitch_pct: -2.0,
            volume_pct: -5.0,
        },
    }
}

fn mood_prosody(mood: Mood) -> ProsodyHint {
    match mood {
        Mood::Neutral => ProsodyHint::NEUTRAL,
        Mood::Tense => ProsodyHint {
            rate_pct: 8.0,
            pitch_pct: 5.0,
            volume_pct: 3.0,
        },
        Mood::Calm => ProsodyHint {
            rate_pct: -5.0,
            pitch_pct: -3.0,
            volume_pct: -2.0,
        },
        Mood::Joyful => ProsodyHint {
            rate_pct: 5.0,
            pitch_pct: 8.0,
            volume_pct: 5.0,
        },
        Mood::Somber => ProsodyHint {
            rate_pct: -10.0,
            pitch_pct: -10.0,
            volume_pct: -8.0,
        },
        Mood::Chaotic => ProsodyHint {
            rate_pct: 12.0,
            pitch_pct: 6.0,
            volume_pct: 6.0,
        },
    }
}

fn sum_prosody(a: ProsodyHint, b: ProsodyHint) -> ProsodyHint {
    ProsodyHint {
        rate_pct: a.rate_pct + b.rate_pct,
        pitch_pct: a.pitch_pct + b.pitch_pct,
        volume_pct: a.volume_pct + b.volume_pct,
    }
}

/// Maps a `SceneContext` to the prosody and ambient hints consumed
/// downstream (spec.md §10.2 of SPEC_FULL.md): the SSML emitter layers
/// `prosody` on top of its emotion table, the mixer/codec consult `ambient`
/// for the reverb/EQ hint. `ambient_noise_level` boosts volume slightly so
/// quieter delivery still reads over a noisy scene, and raises the high
/// shelf so consonants cut through.
pub fn recommend(scene: &SceneContext) -> SceneRecommendation {
    let prosody = sum_prosody(
        time_of_day_prosody(scene.time_of_day),
        mood_prosody(scene.mood),
    );
    let prosody = ProsodyHint {
        rate_pct: prosody.rate_pct,
        pitch_pct: prosody.pitch_pct,
        volume_pct: prosody.volume_pct + scene.ambient_noise_level * 10.0,
    };

    let base_ambient = location_ambient(scene.location);
    let ambient = AmbientHint {
        reverb_wet: base_ambient.reverb_wet,
        low_shelf_db: base_ambient.low_shelf_db,
        high_shelf_db: base_ambient.high_shelf_db + scene.ambient_noise_level * 2.0,
    };

    SceneRecommendation { prosody, ambient }
}

/// The documented neutral fallback for a context with no particular scene
/// information (spec.md §10.2: "unmapped combinations falling back to a
/// documented neutral default").
pub fn neutral() -> SceneRecommendation {
    SceneRecommendation {
        prosody: ProsodyHint::NEUTRAL,
        ambient: AmbientHint::NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_context_is_close_to_neutral_recommendation() {
        let rec = recommend(&SceneContext::neutral());
        assert_eq!(rec.prosody, ProsodyHint::NEUTRAL);
    }

    #[test]
    fn somber_mood_lowers_rate_and_pitch() {
        let scene = SceneContext {
            mood: Mood::Somber,
            ..SceneContext::neutral()
        };
        let rec = recommend(&scene);
        assert!(rec.prosody.rate_pct < 0.0);
        assert!(rec.prosody.pitch_pct < 0.0);
    }

    #[test]
    fn large_hall_has_more_reverb_than_small_room() {
        let hall = recommend(&SceneContext {
            location: Location::LargeHall,
            ..SceneContext::neutral()
        });
        let room = recommend(&SceneContext {
            location: Location::SmallRoom,
            ..SceneContext::neutral()
        });
        assert!(hall.ambient.reverb_wet > room.ambient.reverb_wet);
    }

    #[test]
    fn ambient_noise_boosts_volume_and_high_shelf() {
        let quiet = recommend(&SceneContext::neutral());
        let noisy = recommend(&SceneContext {
            ambient_noise_level: 1.0,
            ..SceneContext::neutral()
        });
        assert!(noisy.prosody.volume_pct > quiet.prosody.volume_pct);
        assert!(noisy.ambient.high_shelf_db > quiet.ambient.high_shelf_db);
    }
}
