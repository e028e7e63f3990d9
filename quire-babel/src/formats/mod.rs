//! Format implementations
//!
//! Each format converts between its text form and the flat block IR.

pub mod html;
pub mod json;
pub mod markdown;

pub use html::HtmlFormat;
pub use json::JsonFormat;
pub use markdown::MarkdownFormat;
