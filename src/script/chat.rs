//! Chat transcript format: one `Name: message` line per turn
//! (SPEC_FULL.md §10.1). The simplest of the four script formats — no
//! continuation or stage-direction handling, since chat transcripts don't
//! wrap a turn across lines.

use super::parsed_line::ParsedLine;

pub fn parse(input: &str) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    for raw_line in input.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some((speaker, text)) = trimmed.split_once(':') else {
            continue;
        };
        let speaker = speaker.trim();
        let text = text.trim();
        if speaker.is_empty() || text.is_empty() {
            continue;
        }
        let mut parsed = ParsedLine::new(text.to_string());
        parsed.speaker = Some(speaker.to_string());
        lines.push(parsed);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_turn_per_line() {
        let lines = parse("Alice: Good morning.\nBob: Morning yourself.\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].speaker, Some("Alice".to_string()));
        assert_eq!(lines[0].text, "Good morning.");
        assert_eq!(lines[1].speaker, Some("Bob".to_string()));
    }

    #[test]
    fn ignores_lines_with_no_speaker_prefix() {
        let lines = parse("just some narration with no colon\nCarl: hi\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].speaker, Some("Carl".to_string()));
    }
}
