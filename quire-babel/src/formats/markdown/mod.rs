//! Markdown format implementation
//!
//! The dialect is deliberately small and line oriented:
//!
//! | Line form          | Block        | Rendered as                                   |
//! |--------------------|--------------|-----------------------------------------------|
//! | `# text`           | Heading 1    | `<h1>`                                        |
//! | `## text`          | Heading 2    | `<h2>`                                        |
//! | `- [ ] text`       | Task item    | `<p><input type="checkbox"> text</p>`         |
//! | `- [x] text`       | Task item    | `<p><input type="checkbox" checked=""> text</p>` |
//! | `![alt](url)`      | Image        | `<p><img src alt></p>`                        |
//! | `- text`           | Bullet item  | `<li>` inside a `<ul>` run                    |
//! | `N. text`          | Numbered     | `<li>` inside an `<ol>` run                   |
//! | anything else      | Paragraph    | `<p>`                                         |
//!
//! Parsing goes through the line grammar in [`parser`]; serialization walks
//! a DOM and formats it with Comrak ([`serializer`]) before [`normalize`]
//! restores the dialect's spelling. Serializing an IR document therefore
//! renders it to a DOM first, so the IR and live-editor paths share one
//! writer.

pub mod inline;
pub mod normalize;
pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::Format;
use crate::formats::html::serializer::build_dom;
use crate::ir::events::document_to_events;
use crate::ir::nodes::Document;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn description(&self) -> &str {
        "Line-oriented Markdown with task and image extensions"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        Ok(parser::parse_from_markdown(source))
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        let root = build_dom(&document_to_events(doc));
        let markdown = serializer::format_markdown(&root)?;
        Ok(normalize::normalize(&markdown))
    }
}
