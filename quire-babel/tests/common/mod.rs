//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use quire_babel::editor::{EditSession, LiveDocument, SessionOptions};
use quire_babel::upload::CandidateFile;

/// Markup shaped the way a browser editor emits it.
pub const EDITOR_KITCHEN_SINK: &str = concat!(
    "<h1>Weekly plan</h1>",
    "<p>Some <strong>bold</strong> and <em>soft</em> words with <code>code</code>.</p>",
    r#"<p><input type="checkbox" checked=""> ship the release</p>"#,
    r#"<p><input type="checkbox"> write notes</p>"#,
    "<ul><li>apples</li><li>pears</li></ul>",
    "<ol><li>first</li><li>second</li></ol>",
    r#"<p><img src="/uploads/board.png" alt="whiteboard"></p>"#,
    "<p><br></p>",
);

pub fn session(initial: &str) -> EditSession<LiveDocument> {
    EditSession::mount(LiveDocument::new(), initial, SessionOptions::default())
}

pub fn png(name: &str) -> CandidateFile {
    CandidateFile::new(name, Some("image/png".to_string()), b"\x89PNG\r\n\x1a\n".to_vec())
}
