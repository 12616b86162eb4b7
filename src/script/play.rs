//! Play format: `Character Name.` or `CHARACTER NAME:` at the start of a
//! line, dialogue follows on the same line (SPEC_FULL.md §10.1).

use super::parsed_line::ParsedLine;

/// Splits a line into `(speaker, rest)` if it opens with a recognized
/// speaker prefix, trying `NAME:` first, then `Name.`.
fn split_speaker(line: &str) -> Option<(String, String)> {
    if let Some((head, rest)) = line.split_once(':') {
        let head = head.trim();
        if !head.is_empty() && head.chars().next().unwrap().is_alphabetic() {
            let word_count = head.split_whitespace().count();
            if word_count <= 4 {
                return Some((head.to_string(), rest.trim().to_string()));
            }
        }
    }
    if let Some((head, rest)) = line.split_once('.') {
        let head = head.trim();
        let is_name_like = !head.is_empty()
            && head
                .chars()
                .next()
                .map(|c| c.is_uppercase())
                .unwrap_or(false)
            && head.split_whitespace().count() <= 3
            && head.chars().all(|c| c.is_alphabetic() || c.is_whitespace());
        if is_name_like {
            return Some((head.to_string(), rest.trim().to_string()));
        }
    }
    None
}

pub fn parse(input: &str) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    for raw_line in input.lines() {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match split_speaker(trimmed) {
            Some((speaker, text)) if !text.is_empty() => {
                let mut parsed = ParsedLine::new(text);
                parsed.speaker = Some(speaker);
                lines.push(parsed);
            }
            _ => {
                if let Some(last) = lines.last_mut() {
                    last.text.push(' ');
                    last.text.push_str(trimmed);
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colon_form() {
        let lines = parse("ALICE: Good morning.\nBOB: And to you.\n");
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].speaker, Some("ALICE".to_string()));
        assert_eq!(lines[0].text, "Good morning.");
    }

    #[test]
    fn parses_period_form() {
        let lines = parse("Alice. Good morning.\n");
        assert_eq!(lines[0].speaker, Some("Alice".to_string()));
        assert_eq!(lines[0].text, "Good morning.");
    }
}
