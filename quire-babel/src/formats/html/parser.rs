//! HTML parsing (editor HTML → IR)
//!
//! HTML is read the same way the editor's content is: the tree is serialized
//! to Markdown and the Markdown is parsed. Anything the dialect cannot hold is
//! lost exactly as it would be on a save from the editor.

use crate::formats::html::dom::parse_fragment;
use crate::formats::markdown::parser::parse_from_markdown;
use crate::formats::markdown::serializer::serialize_dom;
use crate::ir::nodes::Document;

/// Parse an HTML fragment into a flat document
pub fn parse_from_html(source: &str) -> Document {
    let body = parse_fragment(source);
    parse_from_markdown(&serialize_dom(&body))
}
