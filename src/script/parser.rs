//! Script parsing.
//!
//! Turns the raw dialogue text returned by the LLM into an ordered list of
//! speaker-attributed utterances. Supported line formats:
//!
//! - `Host: ...` / `Guest: ...`
//! - `**Host**: ...` / `## Guest: ...` (markdown decoration)
//! - `主持人: ...` / `嘉宾: ...` (CJK role labels)
//! - `A: ...` / `B: ...`
//!
//! Colons may be ASCII (`:`) or full-width (`：`). Non-marker lines continue
//! the previous utterance, except stage directions wrapped entirely in
//! parentheses, which are discarded.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Speaker, Utterance};

/// Optional leading markdown symbols, a speaker token, optional markdown,
/// a colon (ASCII or full-width), then the utterance text.
static SPEAKER_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\*#\s]*(Host|Guest|主持人|嘉宾|A|B)[\*#\s]*[:：]\s*(.+)").unwrap()
});

static STAGE_DIRECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\(.*\)|（.*）)$").unwrap());

fn speaker_for_token(token: &str) -> Speaker {
    match token.to_uppercase().as_str() {
        "GUEST" | "嘉宾" | "B" => Speaker::Guest,
        // HOST, 主持人, A, and anything the pattern let through
        _ => Speaker::Host,
    }
}

/// Parses a raw script into ordered utterances.
///
/// Never fails; a script with no recognizable speaker lines yields an empty
/// sequence. Utterances whose text is empty after trimming are excluded.
pub fn parse_script(script: &str) -> Vec<Utterance> {
    let mut parsed: Vec<Utterance> = Vec::new();

    for line in script.lines().filter(|l| !l.trim().is_empty()) {
        if let Some(caps) = SPEAKER_LINE.captures(line) {
            let speaker = speaker_for_token(&caps[1]);
            let text = caps[2].trim();
            if !text.is_empty() {
                parsed.push(Utterance {
                    speaker,
                    text: text.to_string(),
                });
            }
        } else if let Some(last) = parsed.last_mut() {
            // Continuation of the previous utterance, unless the line is a
            // stage direction on its own.
            let trimmed = line.trim();
            if !STAGE_DIRECTION.is_match(trimmed) {
                last.text.push(' ');
                last.text.push_str(trimmed);
            }
        }
        // A continuation before any utterance is silently dropped.
    }

    parsed
}
