//! Markdown serialization (live DOM → Markdown)
//!
//! Pipeline: rcdom tree → Comrak AST → Markdown string → normalization.
//!
//! The walk consults an ordered rule table for every element. The task-item
//! rule must win over the plain paragraph/list-item handling, and the bare
//! checkbox rule only applies when no task container claimed the input. All
//! escaping is left to Comrak's CommonMark writer; `normalize` then restores
//! the bits of syntax this dialect wants verbatim.

use crate::error::FormatError;
use crate::formats::html::dom::{
    attr, find_checkbox, is_blank_text, is_block, is_checkbox, is_checked, tag_name, text_content,
};
use crate::formats::markdown::normalize::normalize;
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeLink,
    NodeList, NodeValue,
};
use comrak::{format_commonmark, Arena, ComrakOptions};
use markup5ever_rcdom::{Handle, NodeData};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use tracing::warn;

/// Image references are always written with this alt text.
pub const IMAGE_ALT: &str = "image";

/// Deepest heading level the line grammar reads back.
const MAX_HEADING_LEVEL: u8 = 2;

const STRIKE_MARK: &str = "~~";

static END_LIST_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n*<!-- end list -->\n*").expect("end list pattern"));

/// Serialize a live document tree to normalized Markdown.
///
/// Never fails: if formatting breaks, the concatenated text content of the
/// tree is normalized and returned instead.
pub fn serialize_dom(root: &Handle) -> String {
    let markdown = format_markdown(root).unwrap_or_else(|err| {
        warn!(error = %err, "markdown formatting failed, falling back to text content");
        text_content(root)
    });
    normalize(&markdown)
}

/// Format the tree with Comrak, without normalization.
pub fn format_markdown(root: &Handle) -> Result<String, FormatError> {
    let arena = Arena::new();
    let builder = AstBuilder { arena: &arena };
    let document = builder.alloc(NodeValue::Document);
    builder.blocks(root, document);

    let mut output = Vec::new();
    let options = default_comrak_options();
    format_commonmark(document, &options, &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;

    let markdown = String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))?;

    // Comrak separates adjacent lists with an HTML comment; a blank line is enough here
    Ok(END_LIST_COMMENT
        .replace_all(&markdown, "\n\n")
        .into_owned())
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.strikethrough = true;
    options.render.prefer_fenced = true;
    options
}

/// Override rules, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// A `p`/`li` holding a checkbox becomes `- [x] text`
    TaskItem,
    /// A checkbox outside a task container becomes `[x]` inline
    Checkbox,
    /// Everything else
    Element,
}

const RULES: [Rule; 3] = [Rule::TaskItem, Rule::Checkbox, Rule::Element];

impl Rule {
    fn matches(self, node: &Handle) -> bool {
        match self {
            Rule::TaskItem => {
                matches!(tag_name(node), Some("p" | "li")) && find_checkbox(node).is_some()
            }
            Rule::Checkbox => is_checkbox(node),
            Rule::Element => true,
        }
    }

    fn select(node: &Handle) -> Rule {
        RULES
            .into_iter()
            .find(|rule| rule.matches(node))
            .unwrap_or(Rule::Element)
    }
}

fn task_marker(checked: bool, has_content: bool) -> &'static str {
    match (checked, has_content) {
        (true, true) => "- [x] ",
        (true, false) => "- [x]",
        (false, true) => "- [ ] ",
        (false, false) => "- [ ]",
    }
}

fn list_meta(ordered: bool) -> NodeList {
    NodeList {
        list_type: if ordered {
            ListType::Ordered
        } else {
            ListType::Bullet
        },
        marker_offset: 0,
        padding: 0,
        start: 1,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true,
    }
}

#[derive(Debug, Clone, Copy)]
struct InlineState {
    /// Inside a task container, where the checkbox itself is dropped
    in_task: bool,
    /// Nothing emitted yet, so leading whitespace is trimmed
    at_start: bool,
}

impl InlineState {
    fn block() -> Self {
        Self {
            in_task: false,
            at_start: true,
        }
    }

    fn task() -> Self {
        Self {
            in_task: true,
            at_start: true,
        }
    }
}

struct AstBuilder<'a> {
    arena: &'a Arena<AstNode<'a>>,
}

impl<'a> AstBuilder<'a> {
    fn alloc(&self, value: NodeValue) -> &'a AstNode<'a> {
        self.arena
            .alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
    }

    fn append_new(&self, parent: &'a AstNode<'a>, value: NodeValue) -> &'a AstNode<'a> {
        let node = self.alloc(value);
        parent.append(node);
        node
    }

    /// Convert the children of a block container.
    ///
    /// Runs of inline children sitting directly in the container are wrapped
    /// in a paragraph of their own.
    fn blocks(&self, container: &Handle, parent: &'a AstNode<'a>) {
        let mut loose: Option<&'a AstNode<'a>> = None;
        let mut state = InlineState::block();

        for child in container.children.borrow().iter() {
            if is_block(child) {
                if let Some(paragraph) = loose.take() {
                    self.finish_paragraph(paragraph);
                }
                self.block(child, parent);
                continue;
            }
            if loose.is_none() && (is_blank_text(child) || is_comment(child)) {
                continue;
            }
            let paragraph = match loose {
                Some(paragraph) => paragraph,
                None => {
                    state = InlineState::block();
                    let paragraph = self.append_new(parent, NodeValue::Paragraph);
                    loose = Some(paragraph);
                    paragraph
                }
            };
            self.inline(child, paragraph, &mut state);
        }

        if let Some(paragraph) = loose {
            self.finish_paragraph(paragraph);
        }
    }

    fn block(&self, node: &Handle, parent: &'a AstNode<'a>) {
        if Rule::select(node) == Rule::TaskItem {
            self.task(node, parent);
            return;
        }

        match tag_name(node).unwrap_or_default() {
            tag @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
                let level = tag[1..]
                    .parse::<u8>()
                    .unwrap_or(1)
                    .min(MAX_HEADING_LEVEL);
                let heading = self.append_new(
                    parent,
                    NodeValue::Heading(NodeHeading {
                        level,
                        setext: false,
                    }),
                );
                self.inline_children(node, heading, InlineState::block());
                finish_inline(heading);
            }
            "ul" => self.list(node, parent, false),
            "ol" => self.list(node, parent, true),
            // No quote construct in the line grammar; the quoted blocks stand alone
            "blockquote" => self.blocks(node, parent),
            "pre" => {
                let mut literal = text_content(node);
                if literal.trim().is_empty() {
                    return;
                }
                if !literal.ends_with('\n') {
                    literal.push('\n');
                }
                self.append_new(
                    parent,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: true,
                        fence_char: b'`',
                        fence_length: 3,
                        fence_offset: 0,
                        info: String::new(),
                        literal,
                    }),
                );
            }
            "p" | "li" => {
                let paragraph = self.append_new(parent, NodeValue::Paragraph);
                self.inline_children(node, paragraph, InlineState::block());
                self.finish_paragraph(paragraph);
            }
            _ => self.blocks(node, parent),
        }
    }

    fn finish_paragraph(&self, paragraph: &'a AstNode<'a>) {
        finish_inline(paragraph);
        let top_level = paragraph
            .parent()
            .is_some_and(|parent| matches!(parent.data.borrow().value, NodeValue::Document));
        if top_level {
            self.isolate_images(paragraph);
        }
    }

    /// Give every image in a top-level paragraph a paragraph of its own.
    ///
    /// An image is only recognised at the start of a line, and text trailing
    /// it is read back as a separate paragraph.
    fn isolate_images(&self, paragraph: &'a AstNode<'a>) {
        let children: Vec<_> = paragraph.children().collect();
        if !children.iter().any(|child| is_image(child)) || children.len() == 1 {
            return;
        }

        let mut anchor = paragraph;
        let mut runs = Vec::new();
        let mut run: Option<&'a AstNode<'a>> = None;
        for child in children {
            child.detach();
            let target = if is_image(child) {
                run = None;
                let own = self.alloc(NodeValue::Paragraph);
                anchor.insert_after(own);
                anchor = own;
                own
            } else if let Some(current) = run {
                current
            } else {
                let current = self.alloc(NodeValue::Paragraph);
                anchor.insert_after(current);
                anchor = current;
                runs.push(current);
                run = Some(current);
                current
            };
            target.append(child);
        }

        paragraph.detach();
        for run in runs {
            trim_run(run);
        }
    }

    fn list(&self, node: &Handle, parent: &'a AstNode<'a>, ordered: bool) {
        let list = self.append_new(parent, NodeValue::List(list_meta(ordered)));

        for child in node.children.borrow().iter() {
            if is_blank_text(child) || is_comment(child) {
                continue;
            }
            let item = self.append_new(list, NodeValue::Item(list_meta(ordered)));
            match (tag_name(child), Rule::select(child)) {
                (Some("li"), Rule::TaskItem) => self.task(child, item),
                (Some("li"), _) => self.blocks(child, item),
                _ if is_block(child) => self.block(child, item),
                _ => {
                    let paragraph = self.append_new(item, NodeValue::Paragraph);
                    self.inline(child, paragraph, &mut InlineState::block());
                    finish_inline(paragraph);
                }
            }
            if item.first_child().is_none() {
                item.detach();
            }
        }

        if list.first_child().is_none() {
            list.detach();
        }
    }

    /// Emit a task paragraph: marker text, then the container's own inline content.
    fn task(&self, node: &Handle, parent: &'a AstNode<'a>) {
        let checked = find_checkbox(node).is_some_and(|checkbox| is_checked(&checkbox));
        let paragraph = self.append_new(parent, NodeValue::Paragraph);
        self.inline_children(node, paragraph, InlineState::task());
        finish_inline(paragraph);

        let has_content = paragraph.first_child().is_some();
        let marker = self.alloc(NodeValue::Text(
            task_marker(checked, has_content).to_string(),
        ));
        if paragraph.parent().is_none() {
            // finish_inline detached the empty paragraph
            let paragraph = self.append_new(parent, NodeValue::Paragraph);
            paragraph.append(marker);
        } else {
            paragraph.prepend(marker);
        }
    }

    fn inline_children(&self, node: &Handle, target: &'a AstNode<'a>, mut state: InlineState) {
        for child in node.children.borrow().iter() {
            self.inline(child, target, &mut state);
        }
    }

    fn inline(&self, node: &Handle, parent: &'a AstNode<'a>, state: &mut InlineState) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow().replace('\n', " ");
                let text = if state.at_start {
                    text.trim_start()
                } else {
                    text.as_str()
                };
                if text.is_empty() {
                    return;
                }
                state.at_start = false;
                self.append_new(parent, NodeValue::Text(text.to_string()));
            }
            NodeData::Element { .. } => match Rule::select(node) {
                Rule::Checkbox => {
                    if state.in_task {
                        return;
                    }
                    let mark = if is_checked(node) { "[x]" } else { "[ ]" };
                    state.at_start = false;
                    self.append_new(parent, NodeValue::Text(mark.to_string()));
                }
                Rule::TaskItem | Rule::Element => self.inline_element(node, parent, state),
            },
            _ => {}
        }
    }

    fn inline_element(&self, node: &Handle, parent: &'a AstNode<'a>, state: &mut InlineState) {
        match tag_name(node).unwrap_or_default() {
            "strong" | "b" => self.wrap(node, parent, NodeValue::Strong, state),
            "em" | "i" => self.wrap(node, parent, NodeValue::Emph, state),
            "s" | "strike" | "del" => self.strike(node, parent, state),
            "a" => {
                let url = attr(node, "href").unwrap_or_default();
                let link = NodeValue::Link(NodeLink {
                    url,
                    title: String::new(),
                });
                self.wrap(node, parent, link, state);
            }
            "code" => {
                let literal = text_content(node).replace('\n', " ");
                if literal.is_empty() {
                    return;
                }
                state.at_start = false;
                // Inline code spans are single-backtick only; anything else stays escaped text
                let value = if literal.contains('`') {
                    NodeValue::Text(literal)
                } else {
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal,
                    })
                };
                self.append_new(parent, value);
            }
            "img" => {
                let Some(src) = attr(node, "src").filter(|src| !src.is_empty()) else {
                    return;
                };
                state.at_start = false;
                let image = self.append_new(
                    parent,
                    NodeValue::Image(NodeLink {
                        url: src,
                        title: String::new(),
                    }),
                );
                self.append_new(image, NodeValue::Text(IMAGE_ALT.to_string()));
            }
            "br" => {
                if !state.at_start {
                    self.append_new(parent, NodeValue::SoftBreak);
                }
            }
            "input" | "script" | "style" => {}
            _ => {
                for child in node.children.borrow().iter() {
                    self.inline(child, parent, state);
                }
            }
        }
    }

    /// Comrak writes a single tilde, so the marks go out as raw inline text.
    fn strike(&self, node: &Handle, parent: &'a AstNode<'a>, state: &mut InlineState) {
        let open = self.append_new(parent, NodeValue::HtmlInline(STRIKE_MARK.to_string()));
        for child in node.children.borrow().iter() {
            self.inline(child, parent, state);
        }
        if open.next_sibling().is_none() {
            open.detach();
        } else {
            self.append_new(parent, NodeValue::HtmlInline(STRIKE_MARK.to_string()));
        }
    }

    fn wrap(
        &self,
        node: &Handle,
        parent: &'a AstNode<'a>,
        value: NodeValue,
        state: &mut InlineState,
    ) {
        let wrapper = self.append_new(parent, value);
        for child in node.children.borrow().iter() {
            self.inline(child, wrapper, state);
        }
        if wrapper.first_child().is_none() {
            wrapper.detach();
        }
    }
}

fn is_comment(node: &Handle) -> bool {
    matches!(node.data, NodeData::Comment { .. })
}

fn is_image(node: &AstNode<'_>) -> bool {
    matches!(node.data.borrow().value, NodeValue::Image(_))
}

/// Strip the whitespace and breaks left at the edges of a split paragraph.
fn trim_run(run: &AstNode<'_>) {
    while let Some(first) = run.first_child() {
        if !trim_edge(first, str::trim_start) {
            break;
        }
    }
    while let Some(last) = run.last_child() {
        if !trim_edge(last, str::trim_end) {
            break;
        }
    }
    if run.first_child().is_none() {
        run.detach();
    }
}

/// Trim an edge node, returning whether it was removed.
fn trim_edge(node: &AstNode<'_>, trim: fn(&str) -> &str) -> bool {
    let mut ast = node.data.borrow_mut();
    let emptied = match &mut ast.value {
        NodeValue::SoftBreak => true,
        NodeValue::Text(text) => {
            let trimmed = trim(text.as_str()).to_string();
            *text = trimmed;
            text.is_empty()
        }
        _ => false,
    };
    drop(ast);
    if emptied {
        node.detach();
    }
    emptied
}

/// Drop trailing line breaks and remove the node entirely when nothing is left.
fn finish_inline(node: &AstNode<'_>) {
    while let Some(last) = node.last_child() {
        if matches!(last.data.borrow().value, NodeValue::SoftBreak) {
            last.detach();
        } else {
            break;
        }
    }
    if node.first_child().is_none() {
        node.detach();
    }
}
