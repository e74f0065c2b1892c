//! Title and script extraction from raw LLM completions.
//!
//! The script-generation model returns free-form text that usually carries a
//! title and the dialogue body, but the framing varies between runs. The
//! extraction here is deliberately tolerant: titles may be `Title:` /
//! `标题：` / `Podcast Title:` lines or markdown headings, the body may be
//! introduced by a `Script:` / `正文：` / `脚本：` marker or start directly
//! at the first speaker line.

use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:Title|标题|Podcast Title)[:：][ \t]*(.+)$|^\s*#{1,2}[ \t]+(.+)$")
        .unwrap()
});

static SCRIPT_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:Script|正文|脚本)[:：]").unwrap());

static FIRST_SPEAKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:Host|Guest|主持人|嘉宾|A|B)\s*[:：]").unwrap());

const DEFAULT_TITLE: &str = "Weibo Insights Podcast";

/// Title plus dialogue body extracted from one LLM completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutline {
    pub title: String,
    pub script: String,
}

fn clean_title(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix(['\'', '"'])
        .unwrap_or(trimmed);
    let trimmed = trimmed
        .strip_suffix(['\'', '"'])
        .unwrap_or(trimmed);
    trimmed.replace("**", "").trim().to_string()
}

/// Extracts `{title, script}` from raw completion text.
pub fn extract_outline(text: &str) -> ScriptOutline {
    let mut title = DEFAULT_TITLE.to_string();
    if let Some(caps) = TITLE_LINE.captures(text) {
        if let Some(raw) = caps.get(1).or_else(|| caps.get(2)) {
            let cleaned = clean_title(raw.as_str());
            if !cleaned.is_empty() {
                title = cleaned;
            }
        }
    }

    let script = if let Some(m) = SCRIPT_MARKER.find(text) {
        text[m.end()..].trim().to_string()
    } else if let Some(m) = FIRST_SPEAKER.find(text) {
        text[m.start()..].trim().to_string()
    } else {
        text.trim().to_string()
    };

    ScriptOutline { title, script }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_title_and_marked_script() {
        let text = "Title: Tech Rants Weekly\n\nScript:\nHost: Welcome.\nGuest: Glad to be here.";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "Tech Rants Weekly");
        assert!(outline.script.starts_with("Host: Welcome."));
    }

    #[test]
    fn extracts_cjk_title_and_body_marker() {
        let text = "标题：罗老师的创业课\n正文：\n主持人：大家好。\n嘉宾：你们好。";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "罗老师的创业课");
        assert!(outline.script.starts_with("主持人：大家好。"));
    }

    #[test]
    fn takes_markdown_heading_as_title() {
        let text = "# The Comeback Episode\nHost: Let's begin.";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "The Comeback Episode");
        assert_eq!(outline.script, "Host: Let's begin.");
    }

    #[test]
    fn strips_quotes_and_emphasis_from_title() {
        let text = "Title: \"**Bold Claims**\"\nHost: hi";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "Bold Claims");
    }

    #[test]
    fn falls_back_to_first_speaker_line() {
        let text = "Some preamble the model added.\nHost: The actual start.\nGuest: Indeed.";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "Weibo Insights Podcast");
        assert!(outline.script.starts_with("Host: The actual start."));
    }

    #[test]
    fn unmarked_text_passes_through_whole() {
        let text = "no structure at all, just prose";
        let outline = extract_outline(text);
        assert_eq!(outline.title, "Weibo Insights Podcast");
        assert_eq!(outline.script, text);
    }
}
