use crate::model::voice::EmotionKind;

/// The common shape every script/subtitle format is parsed into before
/// entering the Scheduler (spec.md §2 component 3, §10.2 of SPEC_FULL.md).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub index: Option<u32>,
    pub speaker: Option<String>,
    pub text: String,
    pub emotion: Option<EmotionKind>,
    pub start_ms: Option<u64>,
    pub end_ms: Option<u64>,
}

impl ParsedLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            index: None,
            speaker: None,
            text: text.into(),
            emotion: None,
            start_ms: None,
            end_ms: None,
        }
    }
}

/// Strips HTML/style tags like `<i>`/`<b>`/`<font ...>` from a line of text
/// (spec.md §6 SRT: "HTML/style tags are stripped").
pub fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Extracts a leading `SPEAKER: ` prefix (uppercase first token ending in
/// `:`) and any bracketed `[name]` emotion tag, returning the remaining
/// plain text (spec.md §6 SRT).
pub fn extract_speaker_and_emotion(line: &str) -> (Option<String>, Option<EmotionKind>, String) {
    let mut text = line.to_string();

    let speaker = {
        if let Some(colon_idx) = text.find(": ") {
            let candidate = &text[..colon_idx];
            if !candidate.is_empty()
                && candidate
                    .chars()
                    .all(|c| c.is_uppercase() || c.is_whitespace())
            {
                let speaker = candidate.to_string();
                text = text[colon_idx + 2..].to_string();
                Some(speaker)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut emotion = None;
    while let Some(open) = text.find('[') {
        if let Some(close_rel) = text[open..].find(']') {
            let close = open + close_rel;
            let name = &text[open + 1..close];
            if emotion.is_none() {
                emotion = EmotionKind::from_name(name);
            }
            if EmotionKind::from_name(name).is_some() {
                // Recognized emotion markers are removed; unknown bracketed
                // content is left as plain text (spec.md §9 Open Question).
                text.replace_range(open..close + 1, "");
            } else {
                break;
            }
        } else {
            break;
        }
    }

    // Collapse the double space left behind when a marker is removed
    // mid-sentence, without touching intentional single spaces.
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    (speaker, emotion, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_html_tags() {
        assert_eq!(strip_html_tags("<i>Hello</i> world"), "Hello world");
    }

    #[test]
    fn extracts_speaker_and_known_emotion() {
        let (speaker, emotion, text) = extract_speaker_and_emotion("ALICE: Hello [happy]!");
        assert_eq!(speaker, Some("ALICE".to_string()));
        assert_eq!(emotion, Some(EmotionKind::Happy));
        assert_eq!(text, "Hello !");
    }

    #[test]
    fn unknown_bracket_tag_is_left_as_plain_text() {
        let (_, emotion, text) = extract_speaker_and_emotion("Hello [stage-left]!");
        assert_eq!(emotion, None);
        assert!(text.contains("[stage-left]"));
    }
}
