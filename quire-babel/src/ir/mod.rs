//! Intermediate Representation (IR) for quire documents.
//!
//! The IR is deliberately flat: a document is a sequence of blocks, and list
//! containers only exist as start/end markers in the event stream. This
//! mirrors the line-oriented Markdown grammar and keeps round trips
//! compatible with what the editor produces.

pub mod events;
pub mod nodes;
