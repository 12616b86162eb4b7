//! Script formats — screenplay, play, novel, chat (spec.md §2 component 3;
//! supplemented per SPEC_FULL.md §10.1). All four feed the same
//! `ParsedLine` shape the subtitle parsers produce, so they enter the
//! Scheduler identically.

pub mod chat;
pub mod novel;
pub mod parsed_line;
pub mod play;
pub mod screenplay;

pub use parsed_line::ParsedLine;

/// Recognized plain-text script formats a caller may ask to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Screenplay,
    Play,
    Novel,
    Chat,
}

/// Dispatches to the parser for the requested format.
pub fn parse(format: ScriptFormat, input: &str) -> Vec<ParsedLine> {
    match format {
        ScriptFormat::Screenplay => screenplay::parse(input),
        ScriptFormat::Play => play::parse(input),
        ScriptFormat::Novel => novel::parse(input),
        ScriptFormat::Chat => chat::parse(input),
    }
}
