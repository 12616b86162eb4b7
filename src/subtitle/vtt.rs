//! WebVTT parsing and emission (spec.md §6).

use crate::script::parsed_line::{extract_speaker_and_emotion, strip_html_tags, ParsedLine};

fn parse_timecode(s: &str) -> Option<u64> {
    // HH:MM:SS.mmm
    let (hms, mmm) = s.trim().split_once('.')?;
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
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// Parses a VTT document (spec.md §6): begins with the literal `WEBVTT`
/// line, timecodes use `.` as the sub-second separator, cue identifiers (a
/// line preceding the timecode that is not itself a timecode) are ignored.
pub fn parse(input: &str) -> Vec<ParsedLine> {
    let mut lines = Vec::new();
    let normalized = input.replace("\r\n", "\n");
    let mut blocks = normalized.split("\n\n");

    let Some(header) = blocks.next() else {
        return lines;
    };
    if !header.trim_start().starts_with("WEBVTT") {
        return lines;
    }

    for block in blocks {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let mut block_lines = block.lines();
        let mut first = block_lines.next().unwrap_or("");

        // A cue identifier line precedes the timecode; skip it.
        if !first.contains("-->") {
            let Some(next) = block_lines.next() else {
                continue;
            };
            first = next;
        }

        let Some((start_str, end_str)) = first.split_once("-->") else {
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
            index: None,
            speaker,
            text,
            emotion,
            start_ms: Some(start_ms),
            end_ms: Some(end_ms),
        });
    }

    lines
}

/// Re-emits parsed lines as a VTT document, preserving the `WEBVTT` header
/// and `.` separator (spec.md §6).
pub fn emit(lines: &[ParsedLine]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for line in lines {
        let start = line.start_ms.unwrap_or(0);
        let end = line.end_ms.unwrap_or(start);
        out.push_str(&format_timecode(start));
        out.push_str(" --> ");
        out.push_str(&format_timecode(end));
        out.push('\n');
        if let Some(speaker) = &line.speaker {
            out.push_str(speaker);
            out.push_str(": ");
        }
        out.push_str(&line.text);
        out.push_str("\n\n");
    }
    out.trim_end().to_string() + "\n"
}
