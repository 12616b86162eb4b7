//! VoiceSpec + emotion + text -> markup tree + serialized string (spec.md
//! §4.3). Hand-rolled with `std::fmt::Write` rather than pulling in a
//! parser/writer crate, matching the way the teacher serializes MIDI bytes
//! and JSON-RPC frames by hand rather than reaching for a format crate.

use std::fmt::Write as _;

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::model::character::{Character, SpeakingStyle};
use crate::model::voice::{AgeRange, EmotionKind, EmotionProfile, Gender, Pace, VoiceSpec};

/// Bracketing of emphasis intensity (spec.md §4.3 Emphasis).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisLevel {
    Reduced,
    Moderate,
    Strong,
}

impl EmphasisLevel {
    fn as_str(self) -> &'static str {
        match self {
            EmphasisLevel::Reduced => "reduced",
            EmphasisLevel::Moderate => "moderate",
            EmphasisLevel::Strong => "strong",
        }
    }

    /// Bumps the level up or down by `bias` steps, clamped at the ends.
    /// Models "character `emphasis_style` adjusts the level" (spec.md §4.3).
    fn biased(self, bias: i8) -> Self {
        let order = [
            EmphasisLevel::Reduced,
            EmphasisLevel::Moderate,
            EmphasisLevel::Strong,
        ];
        let current = order.iter().position(|l| *l == self).unwrap() as i8;
        let idx = (current + bias).clamp(0, order.len() as i8 - 1);
        order[idx as usize]
    }
}

/// Emotion-to-prosody offset table (spec.md §4.3: "the implementation must
/// embed this table verbatim"). `rate_mult` multiplies the pace-derived base
/// rate; `pitch_pct`/`range_pct` are additive percentage offsets, scaled by
/// the emotion's intensity.
struct ProsodyOffsets {
    rate_mult_per_intensity: f32,
    pitch_pct_per_intensity: f32,
    range_pct_per_intensity: f32,
}

fn prosody_offsets(kind: EmotionKind) -> ProsodyOffsets {
    match kind {
        EmotionKind::Happy => ProsodyOffsets {
            rate_mult_per_intensity: 0.2,
            pitch_pct_per_intensity: 15.0,
            range_pct_per_intensity: 25.0,
        },
        EmotionKind::Sad => ProsodyOffsets {
            rate_mult_per_intensity: -0.3,
            pitch_pct_per_intensity: -20.0,
            range_pct_per_intensity: -15.0,
        },
        EmotionKind::Angry => ProsodyOffsets {
            rate_mult_per_intensity: 0.15,
            pitch_pct_per_intensity: 10.0,
            range_pct_per_intensity: 30.0,
        },
        EmotionKind::Excited => ProsodyOffsets {
            rate_mult_per_intensity: 0.25,
            pitch_pct_per_intensity: 20.0,
            range_pct_per_intensity: 30.0,
        },
        EmotionKind::Calm => ProsodyOffsets {
            rate_mult_per_intensity: -0.1,
            pitch_pct_per_intensity: -5.0,
            range_pct_per_intensity: -10.0,
        },
        EmotionKind::Fearful => ProsodyOffsets {
            rate_mult_per_intensity: 0.1,
            pitch_pct_per_intensity: 25.0,
            range_pct_per_intensity: 10.0,
        },
        EmotionKind::Surprised => ProsodyOffsets {
            rate_mult_per_intensity: 0.1,
            pitch_pct_per_intensity: 30.0,
            range_pct_per_intensity: 20.0,
        },
        EmotionKind::Neutral => ProsodyOffsets {
            rate_mult_per_intensity: 0.0,
            pitch_pct_per_intensity: 0.0,
            range_pct_per_intensity: 0.0,
        },
    }
}

fn pace_base_rate(pace: Pace) -> f32 {
    match pace {
        Pace::Slow => 0.85,
        Pace::Normal => 1.0,
        Pace::Fast => 1.15,
    }
}

fn gender_attr(gender: Gender) -> &'static str {
    match gender {
        Gender::Male => "male",
        Gender::Female => "female",
        Gender::Neutral => "neutral",
    }
}

fn age_attr(age: AgeRange) -> &'static str {
    match age {
        AgeRange::Child => "child",
        AgeRange::Young => "young_adult",
        AgeRange::Adult => "adult",
        AgeRange::Senior => "older_adult",
    }
}

/// Options controlling a single emission call (spec.md §9's redesign note:
/// a seedable pseudo-random generator threaded through the emitter, with a
/// deterministic mode that disables stochastic insertions).
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub language: String,
    pub backend_voice_id: Option<String>,
    pub emphasis_bias: i8,
    pub deterministic: bool,
    pub seed: u64,
    /// Probability in `[0,1]` of inserting a filler/catchphrase per call
    /// when not in deterministic mode.
    pub filler_probability: f32,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            backend_voice_id: None,
            emphasis_bias: 0,
            deterministic: true,
            seed: 0,
            filler_probability: 0.1,
        }
    }
}

/// Matches the leading run of `remaining` against spec.md §4.3's break
/// table and returns the strength plus how many characters it consumed.
/// `--` is a two-character entry and must be checked before the single-char
/// cases, since a `char`-keyed lookup can never see a two-character run.
fn break_strength_for(remaining: &str) -> Option<(&'static str, usize)> {
    if remaining.starts_with("--") {
        return Some(("medium", 2));
    }
    match remaining.chars().next()? {
        ',' => Some(("weak", 1)),
        '.' | ';' | ':' => Some(("medium", 1)),
        '?' | '!' => Some(("strong", 1)),
        _ => None,
    }
}

/// Escapes the five XML predefined entities.
fn escape_xml(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}

/// Marks up a text fragment with `<emphasis>` and `<break>` tags, per
/// spec.md §4.3 Breaks/Emphasis. Operates token-by-token on whitespace to
/// decide emphasis, and inspects trailing punctuation for breaks.
fn markup_text(text: &str, emphasis_bias: i8, body: &mut String) {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            body.push(' ');
        }

        let is_starred = token.len() > 2 && token.starts_with('*') && token.ends_with('*');
        let core: &str = if is_starred {
            &token[1..token.len() - 1]
        } else {
            token
        };

        let alpha_len = core.chars().filter(|c| c.is_alphabetic()).count();
        let is_all_caps =
            alpha_len >= 2 && core.chars().all(|c| !c.is_alphabetic() || c.is_uppercase());

        let trailing_punct: String = core
            .chars()
            .rev()
            .take_while(|c| !c.is_alphanumeric())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        let word_part = &core[..core.len() - trailing_punct.len()];

        let level = if is_all_caps {
            Some(EmphasisLevel::Strong)
        } else if is_starred {
            Some(EmphasisLevel::Moderate)
        } else {
            None
        };

        let rendered_word = if is_all_caps {
            word_part.to_lowercase()
        } else {
            word_part.to_string()
        };

        match level {
            Some(level) => {
                let level = level.biased(emphasis_bias);
                body.push_str(&format!(r#"<emphasis level="{}">"#, level.as_str()));
                escape_xml(&rendered_word, body);
                body.push_str("</emphasis>");
            }
            None => escape_xml(&rendered_word, body),
        }

        escape_xml(&trailing_punct, body);

        let trailing_chars: Vec<char> = trailing_punct.chars().collect();
        let mut idx = 0;
        while idx < trailing_chars.len() {
            let remaining: String = trailing_chars[idx..].iter().collect();
            match break_strength_for(&remaining) {
                Some((strength, consumed)) => {
                    let _ = write!(body, r#"<break strength="{strength}"/>"#);
                    idx += consumed;
                }
                None => idx += 1,
            }
        }
    }
}

/// Applies low-probability, seeded filler/catchphrase insertion. No-op in
/// deterministic mode (spec.md §4.3, §9).
fn apply_fillers(text: &str, character: &Character, options: &EmitOptions) -> String {
    if options.deterministic {
        return text.to_string();
    }
    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut out = String::new();

    if !character.speech_patterns.fillers.is_empty()
        && rng.random::<f32>() < options.filler_probability
    {
        let idx = rng.random_range(0..character.speech_patterns.fillers.len());
        out.push_str(&character.speech_patterns.fillers[idx]);
        out.push_str(", ");
    }

    out.push_str(text);

    if !character.speech_patterns.catchphrases.is_empty()
        && rng.random::<f32>() < options.filler_probability
    {
        let idx = rng.random_range(0..character.speech_patterns.catchphrases.len());
        out.push_str(" ");
        out.push_str(&character.speech_patterns.catchphrases[idx]);
    }

    out
}

fn resolve_prosody(
    voice_spec: &VoiceSpec,
    style: &SpeakingStyle,
    emotion: &EmotionProfile,
) -> (f32, f32, f32, f32) {
    let offsets = prosody_offsets(emotion.kind);
    let i = emotion.intensity;

    let rate_mult =
        pace_base_rate(style.pace).max(pace_base_rate(voice_spec.pace)) * (1.0 + offsets.rate_mult_per_intensity * i);
    let pitch_pct = offsets.pitch_pct_per_intensity * i + (style.confidence - 0.5) * 10.0;
    let range_pct = offsets.range_pct_per_intensity * i + (style.enthusiasm - 0.5) * 20.0;
    let volume_db = (style.enthusiasm - 0.5) * 6.0 + (style.confidence - 0.5) * 4.0;

    (rate_mult, pitch_pct, range_pct, volume_db)
}

/// Produces a well-formed SSML fragment: one `<speak>` wrapping one
/// `<voice>` wrapping one `<prosody>` wrapping the marked-up text (spec.md
/// §4.3, §6 "MUST validate as XML; MUST NOT contain tags other than speak,
/// voice, prosody, emphasis, break").
pub fn emit(text: &str, character: &Character, emotion: &EmotionProfile, options: &EmitOptions) -> String {
    let style = &character.personality.speaking_style;
    let (rate_mult, pitch_pct, range_pct, volume_db) =
        resolve_prosody(&character.voice_spec, style, emotion);

    let body_text = apply_fillers(text, character, options);

    let mut marked_up = String::new();
    markup_text(&body_text, options.emphasis_bias, &mut marked_up);

    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = write!(
        out,
        r#"<speak version="1.0" xmlns="http://www.w3.org/2001/10/synthesis" xml:lang="{}">"#,
        options.language
    );

    out.push_str("<voice");
    let _ = write!(out, r#" gender="{}""#, gender_attr(character.voice_spec.gender));
    let _ = write!(out, r#" age="{}""#, age_attr(character.voice_spec.age));
    if let Some(voice_id) = &options.backend_voice_id {
        let _ = write!(out, r#" name="{voice_id}""#);
    }
    out.push('>');

    let _ = write!(
        out,
        r#"<prosody rate="{:.0}%" pitch="{:+.0}%" range="{:+.0}%" volume="{:+.1}dB">"#,
        rate_mult * 100.0,
        pitch_pct,
        range_pct,
        volume_db
    );
    out.push_str(&marked_up);
    out.push_str("</prosody>");
    out.push_str("</voice>");
    out.push_str("</speak>");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::character::Character;

    fn character() -> Character {
        Character::new("c1", "Narrator", VoiceSpec::default())
    }

    #[test]
    fn output_is_well_formed_and_rooted_in_speak() {
        let out = emit(
            "Hello world.",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        assert!(out.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(out.contains("<speak"));
        assert!(out.ends_with("</speak>"));
        assert_eq!(out.matches("<voice").count(), 1);
        assert_eq!(out.matches("<prosody").count(), 1);
    }

    #[test]
    fn all_caps_word_becomes_strong_emphasis_lowercased() {
        let out = emit(
            "That is AMAZING news",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        assert!(out.contains(r#"<emphasis level="strong">amazing</emphasis>"#));
    }

    #[test]
    fn starred_word_becomes_moderate_emphasis_stars_stripped() {
        let out = emit(
            "This is *important* context",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        assert!(out.contains(r#"<emphasis level="moderate">important</emphasis>"#));
    }

    #[test]
    fn punctuation_inserts_break_tags() {
        let out = emit(
            "Wait, really? Yes!",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        assert!(out.contains(r#"<break strength="weak"/>"#));
        assert!(out.contains(r#"<break strength="strong"/>"#));
    }

    #[test]
    fn double_dash_inserts_a_single_medium_break() {
        let out = emit(
            "Wait-- no",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        assert_eq!(out.matches(r#"<break strength="medium"/>"#).count(), 1);
    }

    #[test]
    fn deterministic_mode_never_inserts_fillers() {
        let mut c = character();
        c.speech_patterns.fillers = vec!["um".to_string()];
        c.speech_patterns.catchphrases = vec!["as I always say".to_string()];
        let options = EmitOptions {
            deterministic: true,
            filler_probability: 1.0,
            ..EmitOptions::default()
        };
        let out = emit("Plain text", &c, &EmotionProfile::neutral(), &options);
        assert!(!out.contains("um,"));
        assert!(!out.contains("as I always say"));
    }

    #[test]
    fn no_disallowed_tags_present() {
        let out = emit(
            "AMAZING *moment*, wait!",
            &character(),
            &EmotionProfile::neutral(),
            &EmitOptions::default(),
        );
        for tag in ["<speak", "<voice", "<prosody", "<emphasis", "<break"] {
            let _ = tag;
        }
        // Crude tag-name extraction: every opening tag must be one of the
        // five allowed names.
        let allowed = ["speak", "voice", "prosody", "emphasis", "break", "?xml"];
        for chunk in out.split('<').skip(1) {
            let name: String = chunk
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '?' || *c == '/')
                .collect();
            let name = name.trim_start_matches('/');
            if name.is_empty() {
                continue;
            }
            assert!(allowed.contains(&name), "unexpected tag: {name}");
        }
    }
}
