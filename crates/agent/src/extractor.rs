//! `[ORDER: id, qty]` tag scanning.
//!
//! Assistant text is untrusted. The grammar is deliberately narrow: a tag
//! lives on a single line, the identifier is everything up to the first
//! comma, and the quantity is a run of decimal digits. Anything that starts
//! like a tag but does not fit is dropped from the visible text and reported
//! as malformed, never as an error.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// One well-formed tag, in the order it appeared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedInstruction {
    pub raw_id: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub cleaned_text: String,
    pub instructions: Vec<ExtractedInstruction>,
    /// Raw spans of tags that were removed but could not be parsed.
    pub malformed: Vec<String>,
}

fn tag_span() -> &'static Regex {
    static TAG_SPAN: OnceLock<Regex> = OnceLock::new();
    TAG_SPAN.get_or_init(|| Regex::new(r"\[ORDER:[^\]\n]*\]").expect("tag span pattern is valid"))
}

fn tag_body() -> &'static Regex {
    static TAG_BODY: OnceLock<Regex> = OnceLock::new();
    TAG_BODY.get_or_init(|| {
        Regex::new(r"^\[ORDER:([^,\[\]\n]*),\s*([0-9]+)\s*\]$")
            .expect("tag body pattern is valid")
    })
}

/// Scans `text` left to right for order tags.
pub fn extract(text: &str) -> Extraction {
    let mut instructions = Vec::new();
    let mut malformed = Vec::new();

    for span in tag_span().find_iter(text) {
        match parse_tag(span.as_str()) {
            Some(instruction) => instructions.push(instruction),
            None => {
                warn!(
                    event_name = "ordering.tag.malformed",
                    tag = span.as_str(),
                    "skipping malformed order tag"
                );
                malformed.push(span.as_str().to_string());
            }
        }
    }

    Extraction { cleaned_text: strip_tags(text), instructions, malformed }
}

fn parse_tag(span: &str) -> Option<ExtractedInstruction> {
    let captures = tag_body().captures(span)?;
    let raw_id = captures.get(1)?.as_str().trim();
    if raw_id.is_empty() {
        return None;
    }
    let quantity = captures.get(2)?.as_str().parse::<u32>().ok()?;

    Some(ExtractedInstruction { raw_id: raw_id.to_string(), quantity })
}

/// Removes every tag span. Lines that held a tag get their whitespace collapsed, and are dropped
/// when nothing else was on them; other lines are kept verbatim.
fn strip_tags(text: &str) -> String {
    let pattern = tag_span();
    if !pattern.is_match(text) {
        return text.trim().to_string();
    }

    let kept = text
        .lines()
        .filter_map(|line| {
            if !pattern.is_match(line) {
                return Some(line.to_string());
            }
            let without_tags = pattern.replace_all(line, " ");
            let collapsed = without_tags.split_whitespace().collect::<Vec<_>>().join(" ");
            (!collapsed.is_empty()).then_some(collapsed)
        })
        .collect::<Vec<_>>();

    kept.join("\n").trim().to_string()
}
