//! HTML format implementation
//!
//! HTML here means the fragment an editing surface works on, not a page.
//!
//! # Library Choice
//!
//! We use the `html5ever` + `markup5ever_rcdom` pair for parsing and serialization:
//! - `html5ever`: Browser-grade HTML5 parser from the Servo project
//! - `markup5ever_rcdom`: Reference-counted DOM tree implementation
//!
//! The same `Handle` tree backs rendering, the Markdown serializer's walk and
//! the live document, so there is exactly one DOM model in the crate.
//!
//! # Element Mapping
//!
//! | Block         | HTML                                              |
//! |---------------|---------------------------------------------------|
//! | Heading       | `<h1>` / `<h2>`                                   |
//! | Paragraph     | `<p>`                                             |
//! | TaskItem      | `<p><input type="checkbox"[ checked=""]> text</p>` |
//! | BulletItem    | `<li>` in `<ul>`                                  |
//! | NumberedItem  | `<li>` in `<ol>`                                  |
//! | Image         | `<p><img src alt></p>`                            |
//! | Bold/Italic/Code | `<strong>` / `<em>` / `<code>`                 |
//!
//! Empty documents render to `<p><br></p>` so an editor always has a line to
//! place the caret on.

pub mod dom;
pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;

/// Format implementation for editor HTML
pub struct HtmlFormat;

impl Format for HtmlFormat {
    fn name(&self) -> &str {
        "html"
    }

    fn description(&self) -> &str {
        "Editor HTML fragment"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::parse_from_html(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        serializer::serialize_to_html(doc)
    }
}
