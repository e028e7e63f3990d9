//! Markdown format tests
//!
//! Rendering (Markdown → editor HTML), serialization (editor HTML → Markdown)
//! and the round trip between them.

mod render;
mod roundtrip;
mod serialize;
