//! Markdown ↔ rich-text conversion and editor synchronization
//!
//!     This crate converts between a small, line-oriented Markdown dialect and the HTML tree an
//!     editing surface works on, and keeps the two in step while a user types and images upload.
//!
//!     TLDR:
//!         - `render` turns Markdown into editor HTML; `serialize` turns a live tree back.
//!         - Markdown produced by `serialize` survives `render` → `serialize` unchanged.
//!         - Nothing here fails on user content: unknown lines are paragraphs, formatter
//!           failures fall back to plain text.
//!
//! Architecture
//!
//!     The format layer follows the same split for every format: a parser into the flat IR
//!     (./ir), a serializer out of it, and a Format impl registered in the FormatRegistry.
//!     Markdown parsing is our own line grammar; Markdown writing is delegated to Comrak's
//!     CommonMark formatter; DOM building, parsing and serialization go through html5ever.
//!
//!     The editor layer sits on top: an EditorSurface (the live tree), the EditSession
//!     controller (debounce, echo suppression, clear/submit), and the image capture pipeline
//!     feeding an async Uploader.
//!
//!     This is a pure lib, that is, it powers quire-cli but is shell agnostic: no code here
//!     prints, reads env vars or spawns a runtime. Time is always passed in.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait definition
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── transforms.rs           # round-trip helpers
//!     ├── formats
//!     │   ├── markdown            # line grammar, inline runs, serializer, normalization
//!     │   ├── html                # DOM helpers, renderer, HTML import
//!     │   └── json                # IR dump
//!     ├── ir                      # flat blocks + list-run events
//!     ├── editor                  # surface trait, live document, debouncer, session
//!     ├── upload                  # capture pipeline, uploader seam, host bridge
//!     └── host.rs                 # host signal types
//!
//! Testing
//!     tests
//!     └── <area>
//!         └── <testname>.rs
//!
//!     Note that rust does not by default discover tests in subdirectories, so tests/lib.rs
//!     includes them as modules.
//!
//! Core Algorithms
//!
//!     Lists are not stored: a document is a flat sequence of blocks and list containers are
//!     derived from contiguous runs of items of the same kind (./ir/events.rs). The Markdown
//!     serializer is a structural DOM walk with an ordered rule table, where the task-item rule
//!     overrides plain paragraphs and list items (./formats/markdown/serializer.rs).
//!
pub mod editor;
pub mod error;
pub mod format;
pub mod formats;
pub mod host;
pub mod ir;
pub mod registry;
pub mod transforms;
pub mod upload;

pub use error::{FormatError, UploadError};
pub use format::Format;
pub use formats::html::serializer::PLACEHOLDER_HTML;
pub use registry::FormatRegistry;

use markup5ever_rcdom::Handle;
use tracing::warn;

/// Render Markdown to editor HTML.
///
/// Blank input renders the placeholder paragraph, never an empty string.
pub fn render(markdown: &str) -> String {
    let events = formats::markdown::parser::parse_events(markdown);
    formats::html::serializer::render_events(&events).unwrap_or_else(|err| {
        warn!(error = %err, "rendering failed, showing placeholder");
        PLACEHOLDER_HTML.to_string()
    })
}

/// Serialize a live tree to Markdown.
pub fn serialize(root: &Handle) -> String {
    formats::markdown::serializer::serialize_dom(root)
}

/// Serialize an HTML fragment to Markdown.
pub fn serialize_html(html: &str) -> String {
    serialize(&formats::html::dom::parse_fragment(html))
}

/// Parse Markdown into the flat block IR.
pub fn parse(markdown: &str) -> ir::nodes::Document {
    formats::markdown::parser::parse_from_markdown(markdown)
}
