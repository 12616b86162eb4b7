//! Maps natural-language voice descriptions to a structured `VoiceSpec`
//! (spec.md §4.1). Never fails: unmapped prompts fall back to
//! `VoiceSpec::default()`.

use std::collections::BTreeSet;

use crate::model::voice::{
    Accent, AgeRange, EmotionKind, EmotionProfile, Gender, Pace, PersonalityTag, Timbre, VoiceSpec,
};

/// Keyword groups for an enumerated field, evaluated in order: the first
/// group with a matching synonym wins (spec.md §4.1 rule (b)).
struct SynonymGroup<T> {
    value: T,
    synonyms: &'static [&'static str],
}

fn age_groups() -> Vec<SynonymGroup<AgeRange>> {
    vec![
        SynonymGroup {
            value: AgeRange::Child,
            synonyms: &["child", "kid", "young child", "little"],
        },
        SynonymGroup {
            value: AgeRange::Young,
            synonyms: &["young", "youthful", "teen", "twenties"],
        },
        SynonymGroup {
            value: AgeRange::Senior,
            synonyms: &["senior", "elderly", "old", "aged"],
        },
        SynonymGroup {
            value: AgeRange::Adult,
            synonyms: &["adult", "middle-aged", "mature"],
        },
    ]
}

fn accent_groups() -> Vec<SynonymGroup<Accent>> {
    vec![
        SynonymGroup {
            value: Accent::British,
            synonyms: &["british", "english", "uk", "london"],
        },
        SynonymGroup {
            value: Accent::American,
            synonyms: &["american", "us", "usa", "united states"],
        },
        SynonymGroup {
            value: Accent::Australian,
            synonyms: &["australian", "aussie"],
        },
        SynonymGroup {
            value: Accent::Irish,
            synonyms: &["irish"],
        },
        SynonymGroup {
            value: Accent::Scottish,
            synonyms: &["scottish", "scots"],
        },
        SynonymGroup {
            value: Accent::Indian,
            synonyms: &["indian"],
        },
    ]
}

fn timbre_groups() -> Vec<SynonymGroup<Timbre>> {
    vec![
        SynonymGroup {
            value: Timbre::Deep,
            synonyms: &["deep", "low", "bass", "baritone"],
        },
        SynonymGroup {
            value: Timbre::High,
            synonyms: &["high", "high-pitched", "high pitch", "bright", "soprano"],
        },
        SynonymGroup {
            value: Timbre::Medium,
            synonyms: &["medium", "mid"],
        },
    ]
}

fn pace_groups() -> Vec<SynonymGroup<Pace>> {
    vec![
        SynonymGroup {
            value: Pace::Slow,
            synonyms: &["slow", "unhurried", "leisurely"],
        },
        SynonymGroup {
            value: Pace::Fast,
            synonyms: &["fast", "quick", "rapid", "hurried"],
        },
        SynonymGroup {
            value: Pace::Normal,
            synonyms: &["normal", "moderate", "even"],
        },
    ]
}

fn personality_groups() -> Vec<SynonymGroup<PersonalityTag>> {
    vec![
        SynonymGroup {
            value: PersonalityTag::Cheerful,
            synonyms: &["cheerful", "upbeat", "happy-go-lucky"],
        },
        SynonymGroup {
            value: PersonalityTag::Calm,
            synonyms: &["calm", "soothing", "relaxed", "peaceful"],
        },
        SynonymGroup {
            value: PersonalityTag::Energetic,
            synonyms: &["energetic", "lively", "spirited"],
        },
        SynonymGroup {
            value: PersonalityTag::Wise,
            synonyms: &["wise", "sage", "knowing"],
        },
        SynonymGroup {
            value: PersonalityTag::Friendly,
            synonyms: &["friendly", "warm", "welcoming"],
        },
        SynonymGroup {
            value: PersonalityTag::Professional,
            synonyms: &["professional", "businesslike", "formal"],
        },
        SynonymGroup {
            value: PersonalityTag::Dramatic,
            synonyms: &["dramatic", "theatrical", "intense"],
        },
        SynonymGroup {
            value: PersonalityTag::Mysterious,
            synonyms: &["mysterious", "enigmatic", "cryptic"],
        },
        SynonymGroup {
            value: PersonalityTag::Confident,
            synonyms: &["confident", "assured", "bold"],
        },
        SynonymGroup {
            value: PersonalityTag::Gentle,
            synonyms: &["gentle", "soft", "tender"],
        },
    ]
}

fn first_match<T: Clone>(lowercase_prompt: &str, groups: &[SynonymGroup<T>]) -> Option<T> {
    for group in groups {
        if group
            .synonyms
            .iter()
            .any(|syn| lowercase_prompt.contains(syn))
        {
            return Some(group.value.clone());
        }
    }
    None
}

impl<T: Clone> Clone for SynonymGroup<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            synonyms: self.synonyms,
        }
    }
}

/// Derives the default emotion from personality tags (spec.md §4.1):
/// `cheerful -> happy`, `calm -> calm`, `energetic -> excited`,
/// `dramatic -> excited`, else `neutral`, intensity 0.5.
fn default_emotion_for(personality: &BTreeSet<PersonalityTag>) -> EmotionProfile {
    let kind = if personality.contains(&PersonalityTag::Cheerful) {
        EmotionKind::Happy
    } else if personality.contains(&PersonalityTag::Calm) {
        EmotionKind::Calm
    } else if personality.contains(&PersonalityTag::Energetic) {
        EmotionKind::Excited
    } else if personality.contains(&PersonalityTag::Dramatic) {
        EmotionKind::Excited
    } else {
        EmotionKind::Neutral
    };
    EmotionProfile::new(kind, 0.5)
}

/// Parses a natural-language voice description into a fully-populated
/// `VoiceSpec`. Never fails (spec.md §4.1 Failure).
pub fn interpret(prompt: &str) -> VoiceSpec {
    let lower = prompt.to_lowercase();

    // Exclusion rule (a): `female` suppresses a `male` match inside it (the
    // substring "male" occurs in "female").
    let gender = if lower.contains("female") {
        Gender::Female
    } else if lower.contains("male") {
        Gender::Male
    } else {
        Gender::Neutral
    };

    let age = first_match(&lower, &age_groups()).unwrap_or_default();
    let accent = first_match(&lower, &accent_groups()).unwrap_or_default();
    let timbre = first_match(&lower, &timbre_groups()).unwrap_or_default();
    let pace = first_match(&lower, &pace_groups()).unwrap_or_default();

    // Personality tags accumulate rather than being mutually exclusive
    // (spec.md §4.1 rule (c)).
    let mut personality = BTreeSet::new();
    for group in personality_groups() {
        if group.synonyms.iter().any(|syn| lower.contains(syn)) {
            personality.insert(group.value);
        }
    }

    let default_emotion = default_emotion_for(&personality);

    VoiceSpec {
        gender,
        age,
        accent,
        timbre,
        pace,
        personality,
        default_emotion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_yields_defaults() {
        let spec = interpret("");
        assert_eq!(spec, VoiceSpec::default());
    }

    #[test]
    fn young_british_female_cheerful_energetic() {
        let spec = interpret("Young British female voice, cheerful and energetic, high pitch");
        assert_eq!(spec.gender, Gender::Female);
        assert_eq!(spec.age, AgeRange::Young);
        assert_eq!(spec.accent, Accent::British);
        assert_eq!(spec.timbre, Timbre::High);
        assert_eq!(spec.pace, Pace::Normal);
        assert!(spec.personality.contains(&PersonalityTag::Cheerful));
        assert!(spec.personality.contains(&PersonalityTag::Energetic));
        assert_eq!(spec.default_emotion.kind, EmotionKind::Happy);
        assert_eq!(spec.default_emotion.intensity, 0.5);
    }

    #[test]
    fn female_substring_suppresses_male_match() {
        let spec = interpret("female narrator");
        assert_eq!(spec.gender, Gender::Female);
    }

    #[test]
    fn plain_male_is_detected() {
        let spec = interpret("deep male voice");
        assert_eq!(spec.gender, Gender::Male);
        assert_eq!(spec.timbre, Timbre::Deep);
    }
}
