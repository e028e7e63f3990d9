//! CLI-specific transforms
//!
//! Views of a Markdown source at the stages the engine moves it through:
//!
//! 1. **Parsing** - line grammar → block IR
//!    - `ir-json`: the block IR as JSON
//!    - `ir-blocks`: one line per block (default)
//!
//! 2. **Grouping** - blocks → list-run events
//!    - `events`: the flat event stream the HTML renderer consumes
//!
//! 3. **Rendering** - events → editor HTML
//!    - `html`: the markup loaded into the editor
//!
//! 4. **Serializing** - editor HTML → Markdown
//!    - `markdown`: the text the editor would write back

use quire_babel::formats::markdown::inline::unescape;
use quire_babel::ir::events::{document_to_events, Event};
use quire_babel::ir::nodes::Block;
use quire_babel::transforms::roundtrip;

/// All available CLI transforms
pub const AVAILABLE_TRANSFORMS: &[&str] = &["ir-json", "ir-blocks", "events", "html", "markdown"];

/// Transform used when `inspect` is given none.
pub const DEFAULT_TRANSFORM: &str = "ir-blocks";

/// Execute a named transform on a Markdown source.
///
/// # Examples
///
/// ```ignore
/// let output = execute_transform("- [x] done", "ir-blocks")?;
/// assert_eq!(output, "TaskItem [x] done\n");
/// ```
pub fn execute_transform(source: &str, transform_name: &str) -> Result<String, String> {
    let doc = quire_babel::parse(source);

    match transform_name {
        "ir-json" => serde_json::to_string_pretty(&doc)
            .map(|json| format!("{json}\n"))
            .map_err(|e| format!("JSON serialization failed: {e}")),
        "ir-blocks" => Ok(doc.blocks.iter().map(|b| format!("{}\n", block_line(b))).collect()),
        "events" => {
            let mut depth = 0;
            let mut out = String::new();
            for event in document_to_events(&doc) {
                let line = match &event {
                    Event::StartList(kind) => format!("StartList({})", kind.tag()),
                    Event::EndList => "EndList".to_string(),
                    Event::Block(block) => block_line(block),
                };
                if matches!(event, Event::EndList) {
                    depth -= 1;
                }
                out.push_str(&"  ".repeat(depth));
                out.push_str(&line);
                out.push('\n');
                if matches!(event, Event::StartList(_)) {
                    depth += 1;
                }
            }
            Ok(out)
        }
        "html" => Ok(format!("{}\n", quire_babel::render(source))),
        "markdown" => Ok(format!("{}\n", roundtrip(source))),
        _ => Err(format!(
            "Unknown transform: {transform_name}. Available: {}",
            AVAILABLE_TRANSFORMS.join(", ")
        )),
    }
}

fn block_line(block: &Block) -> String {
    let name = block.kind_name();
    match block {
        Block::Heading { level, text } => format!("{name}({level}) {}", unescape(text)),
        Block::TaskItem { checked, text } => {
            let mark = if *checked { 'x' } else { ' ' };
            format!("{name} [{mark}] {}", unescape(text))
        }
        Block::Paragraph { text } | Block::BulletItem { text } | Block::NumberedItem { text } => {
            format!("{name} {}", unescape(text))
        }
        Block::Image { alt, url } => format!("{name} {alt} -> {url}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ir_blocks_lists_each_block() {
        let output = execute_transform("# Plan\n- [x] draft\n- item\n![](a.png)", "ir-blocks")
            .expect("transform to run");
        assert_eq!(
            output,
            "Heading(1) Plan\nTaskItem [x] draft\nBulletItem item\nImage image -> a.png\n"
        );
    }

    #[test]
    fn test_events_indent_list_runs() {
        let output = execute_transform("- a\n- b\ntext", "events").expect("transform to run");
        assert_eq!(
            output,
            "StartList(ul)\n  BulletItem a\n  BulletItem b\nEndList\nParagraph text\n"
        );
    }

    #[test]
    fn test_ir_json_is_tagged() {
        let output = execute_transform("## Sub", "ir-json").expect("transform to run");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["blocks"][0]["type"], "heading");
        assert_eq!(value["blocks"][0]["level"], 2);
    }

    #[test]
    fn test_unknown_transform() {
        let err = execute_transform("x", "ast-tag").unwrap_err();
        assert!(err.contains("Unknown transform"));
    }
}
