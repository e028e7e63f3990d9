//! HTML surface tests
//!
//! Editing the live document the way a user types into it, then reading the
//! result back as Markdown.

mod live;
