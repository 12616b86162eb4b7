//! Novel format: quoted dialogue with a trailing or leading
//! `said|asked|replied <Name>` attribution (SPEC_FULL.md §10.1).

use super::parsed_line::ParsedLine;

const ATTRIBUTION_VERBS: &[&str] = &["said", "asked", "replied", "shouted", "whispered", "muttered"];

/// Extracts a `Name` from a clause like `said Alice` or `Alice said`.
fn find_attribution(clause: &str) -> Option<String> {
    let words: Vec<&str> = clause.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        let lower = word.trim_matches(|c: char| !c.is_alphabetic()).to_lowercase();
        if ATTRIBUTION_VERBS.contains(&lower.as_str()) {
            // `said Alice` — name follows the verb.
            if let Some(next) = words.get(i + 1) {
                let name: String = next.chars().filter(|c| c.is_alphabetic()).collect();
                if !name.is_empty() && name.chars().next().unwrap().is_uppercase() {
                    return Some(name);
                }
            }
            // `Alice said` — name precedes the verb.
            if i > 0 {
                let prev = words[i - 1];
                let name: String = prev.chars().filter(|c| c.is_alphabetic()).collect();
                if !name.is_empty() && name.chars().next().unwrap().is_uppercase() {
                    return Some(name);
                }
            }
        }
    }
    None
}

pub fn parse(input: &str) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    for paragraph in input.split('\n') {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let mut remainder = paragraph;
        while let Some(open) = remainder.find('"') {
            let after_open = &remainder[open + 1..];
            let Some(close_rel) = after_open.find('"') else {
                break;
            };
            let quoted = &after_open[..close_rel];
            let before = &remainder[..open];
            let after = &after_open[close_rel + 1..];

            // Only the text since the last sentence boundary belongs to
            // *this* quote's leading attribution; anything earlier is the
            // trailing attribution of a previous quote in the same
            // paragraph.
            let before_tail = before
                .rfind(['.', '"'])
                .map(|i| &before[i + 1..])
                .unwrap_or(before);

            let speaker = find_attribution(before_tail).or_else(|| find_attribution(after));

            let mut parsed = ParsedLine::new(quoted.trim().to_string());
            parsed.speaker = speaker;
            if !parsed.text.is_empty() {
                lines.push(parsed);
            }

            remainder = after;
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_attribution() {
        let lines = parse(r#""I can't believe it," said Alice."#);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].speaker, Some("Alice".to_string()));
        assert_eq!(lines[0].text, "I can't believe it,");
    }

    #[test]
    fn leading_attribution() {
        let lines = parse(r#"Alice replied, "Not a chance.""#);
        assert_eq!(lines[0].speaker, Some("Alice".to_string()));
        assert_eq!(lines[0].text, "Not a chance.");
    }

    #[test]
    fn multiple_quotes_in_one_paragraph() {
        let lines = parse(r#""Hello," said Bob. "Hello yourself," said Alice."#);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].speaker, Some("Bob".to_string()));
        assert_eq!(lines[1].speaker, Some("Alice".to_string()));
    }
}
