//! HTML rendering (IR → editor HTML)
//!
//! Pipeline: Events → rcdom tree → HTML string. The output is the fragment
//! the editor surface loads; there is no page wrapper and no sanitization.

use crate::error::FormatError;
use crate::formats::html::dom::{append, append_inline, create_element, create_text, serialize_children};
use crate::formats::markdown::inline::parse_inlines;
use crate::ir::events::{document_to_events, Event};
use crate::ir::nodes::{Block, Document};
use markup5ever_rcdom::Handle;

/// What an empty editor shows: one empty paragraph.
pub const PLACEHOLDER_HTML: &str = "<p><br></p>";

/// Serialize a document to editor HTML
pub fn serialize_to_html(doc: &Document) -> Result<String, FormatError> {
    render_events(&document_to_events(doc))
}

/// Render an event stream, substituting the placeholder for empty output.
pub fn render_events(events: &[Event]) -> Result<String, FormatError> {
    let container = build_dom(events);
    if container.children.borrow().is_empty() {
        return Ok(PLACEHOLDER_HTML.to_string());
    }
    serialize_children(&container)
}

/// Build a detached `<div>` holding the rendered blocks.
pub fn build_dom(events: &[Event]) -> Handle {
    let container = create_element("div", vec![]);
    let mut current_list: Option<Handle> = None;

    for event in events {
        match event {
            Event::StartList(kind) => {
                let list = create_element(kind.tag(), vec![]);
                append(&container, list.clone());
                current_list = Some(list);
            }
            Event::EndList => {
                current_list = None;
            }
            Event::Block(block) => {
                let element = block_element(block);
                match (&current_list, block.list_kind()) {
                    (Some(list), Some(_)) => append(list, element),
                    // An item outside a run still gets a container of its own
                    (None, Some(kind)) => {
                        let list = create_element(kind.tag(), vec![]);
                        append(&list, element);
                        append(&container, list);
                    }
                    _ => append(&container, element),
                }
            }
        }
    }

    container
}

fn block_element(block: &Block) -> Handle {
    match block {
        Block::Heading { level, text } => {
            let heading = create_element(&format!("h{}", (*level).clamp(1, 6)), vec![]);
            append_text_run(&heading, text);
            heading
        }
        Block::Paragraph { text } => {
            let paragraph = create_element("p", vec![]);
            append_text_run(&paragraph, text);
            paragraph
        }
        Block::TaskItem { checked, text } => {
            let paragraph = create_element("p", vec![]);
            let mut attrs = vec![("type", "checkbox")];
            if *checked {
                attrs.push(("checked", ""));
            }
            append(&paragraph, create_element("input", attrs));
            append(&paragraph, create_text(" "));
            append_text_run(&paragraph, text);
            paragraph
        }
        Block::BulletItem { text } | Block::NumberedItem { text } => {
            let item = create_element("li", vec![]);
            append_text_run(&item, text);
            item
        }
        Block::Image { alt, url } => {
            let paragraph = create_element("p", vec![]);
            append(
                &paragraph,
                create_element("img", vec![("src", url.as_str()), ("alt", alt.as_str())]),
            );
            paragraph
        }
    }
}

fn append_text_run(parent: &Handle, text: &str) {
    for inline in parse_inlines(text) {
        append_inline(parent, &inline);
    }
}
