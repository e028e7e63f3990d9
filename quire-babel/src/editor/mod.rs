//! Editing surface and the session controller that keeps it in sync.
//!
//! [`EditorSurface`] is the seam between the controller and whatever holds
//! the live rich-text tree. [`LiveDocument`] is the in-process implementation
//! over the crate's rcdom tree; a host embedding a real browser editor would
//! implement the trait over its own bridge.
//!
//! Positions are character offsets in the surface's linear text: every block
//! contributes its inline characters followed by one newline, embeds (images,
//! checkboxes) count as one character and line breaks as none.

pub mod debounce;
pub mod live;
pub mod session;

pub use debounce::Debouncer;
pub use live::LiveDocument;
pub use session::{EditSession, SessionOptions, SessionState, SyncOutcome};

/// Operations the controller and the capture pipeline need from a live editor.
pub trait EditorSurface {
    /// Replace the whole content with rendered HTML
    fn set_html(&mut self, html: &str);

    /// Current content as an HTML fragment
    fn html(&self) -> String;

    /// Reset to the empty placeholder state
    fn clear(&mut self);

    /// Length of the linear text, trailing newline included
    fn len(&self) -> usize;

    /// True when the surface holds a single empty line
    fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn selection(&self) -> Option<usize>;

    fn set_selection(&mut self, index: usize);

    /// Insert plain text at a position; `\n` splits the current block
    fn insert_text(&mut self, index: usize, text: &str);

    /// Counter bumped by every mutation
    fn revision(&self) -> u64;

    /// Map a position captured at `since` onto the current content.
    ///
    /// Surfaces without an edit history return the position unchanged.
    fn rebase(&self, index: usize, since: u64) -> usize {
        let _ = since;
        index
    }

    /// Serialize the live tree to Markdown
    fn to_markdown(&self) -> String;
}
