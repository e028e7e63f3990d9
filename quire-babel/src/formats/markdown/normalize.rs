//! Post-formatting cleanup of serialized Markdown.
//!
//! The CommonMark writer escapes characters that are significant to the task
//! and image syntax, and lists rendered by the editor can leave numbering in
//! front of checkbox markers. The passes below undo both, in a fixed order.

use once_cell::sync::Lazy;
use regex::Regex;

static ESCAPED_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\[\]!\-])").expect("escape pattern"));
static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline pattern"));
static EMPTY_BOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\]").expect("empty box pattern"));
static UPPER_BOX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[X\]").expect("checked box pattern"));
static PADDED_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(\d+)\.[ ]{2,}").expect("ordinal pattern"));
static NUMBERED_TASK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\d+\.[ \t]*(?:-[ \t]*)?\[( |x)\]").expect("numbered task pattern")
});

/// Run every normalization pass over freshly formatted Markdown.
pub fn normalize(markdown: &str) -> String {
    let text = ESCAPED_MARKUP.replace_all(markdown, "$1");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = EMPTY_BOX.replace_all(&text, "[ ]");
    let text = UPPER_BOX.replace_all(&text, "[x]");
    // Comrak pads single-digit ordinals to the width of two-digit ones
    let text = PADDED_ORDINAL.replace_all(&text, "$1. ");
    let text = NUMBERED_TASK.replace_all(&text, "- [${1}]");
    text.trim().to_string()
}
