//! SRT parsing and emission (spec.md §6).

use crate::script::parsed_line::{extract_speaker_and_emotion, strip_html_tags, ParsedLine};

fn parse_timecode(s: &str) -> Option<u64> {
    // HH:MM:SS,mmm
    let (hms, mmm) = s.trim().split_once(',')?;
    let mut parts = hms.split(':');
    let h: u64 = parts.next()?.parse().ok()?;
    let m: u64 = parts.next()?.parse().ok()?;
    let sec: u64 = parts.next()?.parse().ok()?;
    let ms: u64 = mmm.trim().parse().ok()?;
    Some(((h * 3600 + m * 60 + sec) * 1000) + ms)
}

fn format_timecode(total_ms: u64) -> String {
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Parses an SRT document into a sequence of `ParsedLine`s (spec.md §6):
/// blocks separated by blank lines, each with an integer index, a timecode
/// line, and one or more text lines.
pub fn parse(input: &str) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    let normalized = input.replace("\r\n", "\n");

    for block in normalized.split("\n\n") {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let mut block_lines = block.lines();

        let Some(index_line) = block_lines.next() else {
            continue;
        };
        let Ok(index) = index_line.trim().parse::<u32>() else {
            continue;
        };

        let Some(timecode_line) = block_lines.next() else {
            continue;
        };
        let Some((start_str, end_str)) = timecode_line.split_once("-->") else {
            continue;
        };
        let Some(start_ms) = parse_timecode(start_str) else {
            continue;
        };
        let Some(end_ms) = parse_timecode(end_str) else {
            continue;
        };

        let text_lines: Vec<&str> = block_lines.collect();
        let raw_text = text_lines.join(" ");
        let stripped = strip_html_tags(&raw_text);
        let (speaker, emotion, text) = extract_speaker_and_emotion(&stripped);

        lines.push(ParsedLine {
            index: Some(index),
            speaker,
            text,
            emotion,
            start_ms: Some(start_ms),
            end_ms: Some(end_ms),
        });
    }

    lines
}

/// Re-emits parsed lines as an SRT document: 1-based sequential indices,
/// `SPEAKER: ` prefix restored when present, emotion markers are not
/// restored (spec.md §6: "emit" only guarantees index/times/text
/// reproducibility, and spec.md §8 scenario 5 notes the `[happy]` removal
/// is preserved, i.e. not re-added).
pub fn emit(lines: &[ParsedLine], use_crlf: bool) -> String {
    let newline = if use_crlf { "\r\n" } else { "\n" };
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let index = i as u32 + 1;
        let start = line.start_ms.unwrap_or(0);
        let end = line.end_ms.unwrap_or(start);

        out.push_str(&index.to_string());
        out.push_str(newline);
        out.push_str(&format_timecode(start));
        out.push_str(" --> ");
        out.push_str(&format_timecode(end));
        out.push_str(newline);

        if let Some(speaker) = &line.speaker {
            out.push_str(speaker);
            out.push_str(": ");
        }
        out.push_str(&line.text);
        out.push_str(newline);
        out.push_str(newline);
    }
    out.trim_end_matches(newline).to_string() + newline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_srt_block_with_speaker_and_emotion() {
        let input = "1\n00:00:01,000 --> 00:00:03,000\nALICE: Hello [happy]!\n";
        let lines = parse(input);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.index, Some(1));
        assert_eq!(line.start_ms, Some(1000));
        assert_eq!(line.end_ms, Some(3000));
        assert_eq!(line.speaker, Some("ALICE".to_string()));
        assert_eq!(line.text, "Hello !");
        assert_eq!(
            line.emotion,
            Some(crate::model::voice::EmotionKind::Happy)
        );
    }

    #[test]
    fn round_trip_preserves_index_times_and_text() {
        let input = "1\n00:00:01,000 --> 00:00:03,000\nALICE: Hello [happy]!\n";
        let lines = parse(input);
        let emitted = emit(&lines, false);
        let reparsed = parse(&emitted);
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].index, lines[0].index);
        assert_eq!(reparsed[0].start_ms, lines[0].start_ms);
        assert_eq!(reparsed[0].end_ms, lines[0].end_ms);
        assert_eq!(reparsed[0].text, lines[0].text);
    }

    #[test]
    fn strips_html_and_style_tags() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\n<i>Hello</i> <b>world</b>\n";
        let lines = parse(input);
        assert_eq!(lines[0].text, "Hello world");
    }

    #[test]
    fn multiple_blocks_separated_by_blank_lines() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nFirst\n\n2\n00:00:01,000 --> 00:00:02,000\nSecond\n";
        let lines = parse(input);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text, "Second");
    }
}
