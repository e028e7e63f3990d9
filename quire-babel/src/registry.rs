//! Format lookup for conversions
//!
//! Every conversion the CLI runs goes source text → flat [`Document`] →
//! target text. The registry resolves the two format names (or a file's
//! extension) to [`Format`] implementations and checks that each side can
//! run in the direction asked of it.

use crate::error::FormatError;
use crate::format::Format;
use crate::ir::nodes::Document;
use std::collections::HashMap;
use std::path::Path;

/// Named document formats available for conversion.
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let html = registry.convert("- [ ] milk", "markdown", "html")?;
/// assert_eq!(html, r#"<p><input type="checkbox"> milk</p>"#);
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    /// A registry with nothing in it
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// The markdown, editor HTML and IR JSON formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::formats::markdown::MarkdownFormat);
        registry.register(crate::formats::html::HtmlFormat);
        registry.register(crate::formats::json::JsonFormat);
        registry
    }

    /// Add a format under its own name, replacing any earlier one.
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|format| format.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Format names, sorted for stable `--list-formats` output
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// Name of the format claiming the file's extension, if any.
    ///
    /// Extensions compare case-insensitively, so `Notes.MD` is Markdown.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.formats
            .values()
            .find(|format| format.file_extensions().contains(&extension.as_str()))
            .map(|format| format.name().to_string())
    }

    /// Read `source` as `format` into the flat block IR.
    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let reader = self.get(format)?;
        if !reader.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' cannot be read"
            )));
        }
        reader.parse(source)
    }

    /// Write a document out as `format`.
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        let writer = self.get(format)?;
        if !writer.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{format}' cannot be written"
            )));
        }
        writer.serialize(doc)
    }

    /// Convert text between two formats through the block IR.
    pub fn convert(&self, source: &str, from: &str, to: &str) -> Result<String, FormatError> {
        let doc = self.parse(source, from)?;
        self.serialize(&doc, to)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
