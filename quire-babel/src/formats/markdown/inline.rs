//! Inline formatting for a single text run.
//!
//! Delimiters are matched left to right, non-greedy, with `**` tried before
//! `*` and both before a backtick. A delimiter without a closing partner is
//! kept as literal text, so lenient input never loses characters. A backslash
//! in front of ASCII punctuation yields the punctuation itself, which lets the
//! serializer's escapes (`\*`, `\_`, `\#`) survive a round trip.

use crate::formats::html::dom;
use crate::ir::nodes::InlineContent;

/// Parses a run of inline Markdown into inline content.
pub fn parse_inlines(text: &str) -> Vec<InlineContent> {
    let chars: Vec<char> = text.chars().collect();
    parse_range(&chars)
}

/// Renders a single run to inline HTML (`<strong>`, `<em>`, `<code>`).
pub fn to_html(text: &str) -> String {
    let container = dom::create_element("span", vec![]);
    for inline in parse_inlines(text) {
        dom::append_inline(&container, &inline);
    }
    dom::serialize_children(&container).unwrap_or_else(|_| text.to_string())
}

/// Drops the backslash in front of escaped ASCII punctuation.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn parse_range(chars: &[char]) -> Vec<InlineContent> {
    let mut nodes = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' {
            if let Some(&next) = chars.get(i + 1) {
                if next.is_ascii_punctuation() {
                    text.push(next);
                    i += 2;
                    continue;
                }
            }
            text.push(c);
            i += 1;
            continue;
        }

        if c == '*' && chars.get(i + 1) == Some(&'*') {
            if let Some(close) = find_closing(chars, i + 2, &['*', '*']) {
                flush(&mut text, &mut nodes);
                nodes.push(InlineContent::Bold(parse_range(&chars[i + 2..close])));
                i = close + 2;
                continue;
            }
        }

        if c == '*' {
            if let Some(close) = find_closing(chars, i + 1, &['*']) {
                flush(&mut text, &mut nodes);
                nodes.push(InlineContent::Italic(parse_range(&chars[i + 1..close])));
                i = close + 1;
                continue;
            }
        }

        if c == '`' {
            if let Some(close) = find_closing(chars, i + 1, &['`']) {
                flush(&mut text, &mut nodes);
                let code: String = chars[i + 1..close].iter().collect();
                nodes.push(InlineContent::Code(code));
                i = close + 1;
                continue;
            }
        }

        text.push(c);
        i += 1;
    }

    flush(&mut text, &mut nodes);
    nodes
}

/// Finds the next occurrence of `delimiter` after a non-empty span starting at `from`.
fn find_closing(chars: &[char], from: usize, delimiter: &[char]) -> Option<usize> {
    let width = delimiter.len();
    let mut j = from + 1;
    while j + width <= chars.len() {
        if chars[j - 1] == '\\' && delimiter[0] != '`' {
            j += 1;
            continue;
        }
        if chars[j..j + width] == *delimiter {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn flush(text: &mut String, nodes: &mut Vec<InlineContent>) {
    if !text.is_empty() {
        nodes.push(InlineContent::Text(std::mem::take(text)));
    }
}
