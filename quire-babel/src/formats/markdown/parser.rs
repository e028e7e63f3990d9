//! Markdown parsing (Markdown → IR)
//!
//! The dialect is line oriented: every line is trimmed and classified on its
//! own, first match wins. Blank lines are never content; they only end an open
//! list run. Anything unrecognised is a paragraph, so parsing cannot fail.

use crate::formats::markdown::inline::unescape;
use crate::ir::events::{events_to_document, Event, EventWriter};
use crate::ir::nodes::{Block, Document};
use once_cell::sync::Lazy;
use regex::Regex;

/// Alt text used when an image line leaves it empty.
pub const DEFAULT_IMAGE_ALT: &str = "image";

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,2})[ \t]+(.*)$").expect("heading pattern"));
static TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:-[ \t]*)?\[([ xX])\][ \t]*(.*)$").expect("task pattern")
});
static IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^!\[([^\]]*)\]\(((?:\\.|[^)\s\\])+)\)[ \t]*(.*)$").expect("image pattern")
});
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-[ \t]+(.*)$").expect("bullet pattern"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.[ \t]+(.*)$").expect("numbered pattern"));

/// Parse Markdown into the event stream consumed by the HTML serializer
pub fn parse_events(source: &str) -> Vec<Event> {
    let mut writer = EventWriter::new();

    for line in source.lines().map(str::trim) {
        if line.is_empty() {
            writer.close_list();
            continue;
        }
        for block in classify_line(line) {
            writer.push_block(block);
        }
    }

    writer.finish()
}

/// Parse Markdown string to a flat document
pub fn parse_from_markdown(source: &str) -> Document {
    events_to_document(&parse_events(source))
}

/// Classify one trimmed, non-empty line.
///
/// Usually yields one block; an image line with trailing text yields the image
/// followed by a paragraph holding that text.
pub fn classify_line(line: &str) -> Vec<Block> {
    if let Some(caps) = HEADING.captures(line) {
        return vec![Block::Heading {
            level: caps[1].len() as u8,
            text: caps[2].to_string(),
        }];
    }

    if let Some(caps) = TASK.captures(line) {
        return vec![Block::TaskItem {
            checked: caps[1].eq_ignore_ascii_case("x"),
            text: caps[2].to_string(),
        }];
    }

    if let Some(caps) = IMAGE.captures(line) {
        let alt = match caps[1].trim() {
            "" => DEFAULT_IMAGE_ALT.to_string(),
            alt => unescape(alt),
        };
        let mut blocks = vec![Block::Image {
            alt,
            url: unescape(&caps[2]),
        }];
        let trailing = caps[3].trim();
        if !trailing.is_empty() {
            blocks.push(Block::Paragraph {
                text: trailing.to_string(),
            });
        }
        return blocks;
    }

    if let Some(caps) = BULLET.captures(line) {
        return vec![Block::BulletItem {
            text: caps[1].to_string(),
        }];
    }

    if let Some(caps) = NUMBERED.captures(line) {
        return vec![Block::NumberedItem {
            text: caps[1].to_string(),
        }];
    }

    vec![Block::Paragraph {
        text: line.to_string(),
    }]
}
