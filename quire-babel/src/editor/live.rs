//! In-process live document over an rcdom tree.
//!
//! The tree is kept in a normalized shape: the root holds only block
//! elements, `ul`/`ol` hold only `li`, and a block with no content carries a
//! single `<br>` placeholder. Blocks are addressed through the linear text
//! model described in the parent module.

use crate::editor::EditorSurface;
use crate::formats::html::dom::{
    append, create_element, create_text, find_checkbox, is_blank_text, is_block, is_checked,
    parse_fragment, serialize_children, set_attr, shallow_clone, tag_name, text_content,
};
use crate::formats::html::serializer::PLACEHOLDER_HTML;
use crate::formats::markdown::serializer::serialize_dom;
use markup5ever_rcdom::{Handle, NodeData};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

/// Edits remembered for rebasing stale positions.
const HISTORY_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Insert { index: usize, len: usize },
    Delete { index: usize, len: usize },
    Reset,
}

#[derive(Debug, Clone, Copy)]
struct EditRecord {
    revision: u64,
    edit: Edit,
}

/// A block with its position in the linear text.
struct BlockSlot {
    parent: Handle,
    node: Handle,
    start: usize,
    len: usize,
}

pub struct LiveDocument {
    root: Handle,
    selection: Option<usize>,
    revision: u64,
    history: VecDeque<EditRecord>,
    /// Oldest revision the history still covers
    history_floor: u64,
}

impl LiveDocument {
    /// An empty document showing the placeholder line.
    pub fn new() -> Self {
        Self::from_html(PLACEHOLDER_HTML)
    }

    pub fn from_html(html: &str) -> Self {
        let root = parse_fragment(html);
        normalize_root(&root);
        Self {
            root,
            selection: None,
            revision: 0,
            history: VecDeque::new(),
            history_floor: 0,
        }
    }

    pub fn from_markdown(markdown: &str) -> Self {
        Self::from_html(&crate::render(markdown))
    }

    /// Root container of the live tree
    pub fn root(&self) -> &Handle {
        &self.root
    }

    pub fn block_count(&self) -> usize {
        self.slots().len()
    }

    /// Plain text of every block, each followed by a newline.
    pub fn text(&self) -> String {
        self.slots()
            .iter()
            .map(|slot| format!("{}\n", text_content(&slot.node)))
            .collect()
    }

    /// Remove `len` characters starting at `index`, joining blocks across newlines.
    pub fn delete_text(&mut self, index: usize, len: usize) {
        if len == 0 {
            return;
        }
        let slots = self.slots();
        let (first, from) = locate(&slots, index);
        let (last, to) = locate(&slots, index.saturating_add(len));
        let start = slots[first].start + from;
        let end = slots[last].start + to;
        if end <= start {
            return;
        }

        let merged = shallow_clone(&slots[first].node);
        extend(&merged, slice_children(&slots[first].node, 0, from));
        extend(
            &merged,
            slice_children(&slots[last].node, to, slots[last].len),
        );
        ensure_placeholder(&merged);

        replace_child(&slots[first].parent, &slots[first].node, vec![merged]);
        for slot in &slots[first + 1..=last] {
            remove_child(&slot.parent, &slot.node);
        }
        self.drop_empty_lists();

        self.record(Edit::Delete {
            index: start,
            len: end - start,
        });
    }

    /// Flip the checkbox of a task block. Returns the new state.
    pub fn toggle_task(&mut self, block: usize) -> Option<bool> {
        let slots = self.slots();
        let checkbox = find_checkbox(&slots.get(block)?.node)?;
        let checked = !is_checked(&checkbox);
        set_attr(&checkbox, "checked", checked.then_some(""));
        self.revision += 1;
        Some(checked)
    }

    fn slots(&self) -> Vec<BlockSlot> {
        let mut slots = Vec::new();
        let mut start = 0;
        let mut push = |parent: &Handle, node: &Handle| {
            let len = inline_len(node);
            slots.push(BlockSlot {
                parent: parent.clone(),
                node: node.clone(),
                start,
                len,
            });
            start += len + 1;
        };

        for child in self.root.children.borrow().iter() {
            if matches!(tag_name(child), Some("ul" | "ol")) {
                for item in child.children.borrow().iter() {
                    push(child, item);
                }
            } else {
                push(&self.root, child);
            }
        }
        slots
    }

    fn ensure_block(&mut self) {
        if self.root.children.borrow().is_empty() {
            append(&self.root, placeholder_paragraph());
        }
    }

    fn drop_empty_lists(&mut self) {
        self.root.children.borrow_mut().retain(|child| {
            !matches!(tag_name(child), Some("ul" | "ol")) || !child.children.borrow().is_empty()
        });
        self.ensure_block();
    }

    fn record(&mut self, edit: Edit) {
        self.revision += 1;
        self.history.push_back(EditRecord {
            revision: self.revision,
            edit,
        });
        while self.history.len() > HISTORY_LIMIT {
            if let Some(dropped) = self.history.pop_front() {
                self.history_floor = dropped.revision;
            }
        }
        trace!(revision = self.revision, ?edit, "live document edited");
    }
}

impl Default for LiveDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LiveDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveDocument")
            .field("html", &self.html())
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .finish()
    }
}

impl EditorSurface for LiveDocument {
    fn set_html(&mut self, html: &str) {
        let root = parse_fragment(html);
        normalize_root(&root);
        self.root = root;
        self.selection = None;
        self.record(Edit::Reset);
    }

    fn html(&self) -> String {
        serialize_children(&self.root).unwrap_or_else(|_| PLACEHOLDER_HTML.to_string())
    }

    fn clear(&mut self) {
        *self.root.children.borrow_mut() = vec![placeholder_paragraph()];
        self.selection = None;
        self.record(Edit::Reset);
    }

    fn len(&self) -> usize {
        self.slots().iter().map(|slot| slot.len + 1).sum()
    }

    fn selection(&self) -> Option<usize> {
        self.selection
    }

    fn set_selection(&mut self, index: usize) {
        self.selection = Some(index.min(self.len().saturating_sub(1)));
    }

    fn insert_text(&mut self, index: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ensure_block();
        let slots = self.slots();
        let (at, offset) = locate(&slots, index);
        let slot = &slots[at];

        let after = slice_children(&slot.node, offset, slot.len);
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();

        let head = shallow_clone(&slot.node);
        extend(&head, slice_children(&slot.node, 0, offset));
        push_text(&head, first);
        let mut replacement = vec![head.clone()];

        match rest.split_last() {
            None => extend(&head, after),
            Some((last, middle)) => {
                for line in middle {
                    let block = shallow_clone(&slot.node);
                    push_text(&block, line);
                    replacement.push(block);
                }
                let tail = shallow_clone(&slot.node);
                push_text(&tail, last);
                extend(&tail, after);
                replacement.push(tail);
            }
        }

        for block in &replacement {
            ensure_placeholder(block);
        }
        replace_child(&slot.parent, &slot.node, replacement);

        self.record(Edit::Insert {
            index: slot.start + offset,
            len: text.chars().count(),
        });
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn rebase(&self, index: usize, since: u64) -> usize {
        if since < self.history_floor {
            return index.min(self.len().saturating_sub(1));
        }
        let mut position = index;
        for record in self.history.iter().filter(|r| r.revision > since) {
            match record.edit {
                Edit::Insert { index, len } if index <= position => position += len,
                Edit::Delete { index, len } if index < position => {
                    position -= len.min(position - index);
                }
                _ => {}
            }
        }
        position.min(self.len().saturating_sub(1))
    }

    fn to_markdown(&self) -> String {
        serialize_dom(&self.root)
    }
}

/// Linear length of a node: characters of text, 1 per embed, 0 per line break.
fn inline_len(node: &Handle) -> usize {
    match &node.data {
        NodeData::Text { contents } => contents.borrow().chars().count(),
        NodeData::Element { .. } => match tag_name(node) {
            Some("img" | "input") => 1,
            Some("br") => 0,
            _ => node.children.borrow().iter().map(inline_len).sum(),
        },
        _ => 0,
    }
}

/// Block index and offset within it for a linear position.
///
/// Positions past the end land at the end of the last block.
fn locate(slots: &[BlockSlot], index: usize) -> (usize, usize) {
    for (i, slot) in slots.iter().enumerate() {
        if index <= slot.start + slot.len {
            return (i, index.saturating_sub(slot.start));
        }
    }
    let last = slots.len().saturating_sub(1);
    (last, slots.get(last).map_or(0, |slot| slot.len))
}

/// Copies of the children of `node` covering `[from, to)` of its inline range.
///
/// Children entirely inside the range are shared, partially covered ones are
/// split. Zero-length children (line breaks, comments) are dropped.
fn slice_children(node: &Handle, from: usize, to: usize) -> Vec<Handle> {
    let mut out = Vec::new();
    let mut position = 0;

    for child in node.children.borrow().iter() {
        let len = inline_len(child);
        let (start, end) = (position, position + len);
        position = end;

        if len == 0 || end <= from || start >= to {
            continue;
        }
        if start >= from && end <= to {
            out.push(child.clone());
            continue;
        }

        let local_from = from.saturating_sub(start);
        let local_to = to.min(end) - start;
        match &child.data {
            NodeData::Text { contents } => {
                let piece: String = contents
                    .borrow()
                    .chars()
                    .skip(local_from)
                    .take(local_to - local_from)
                    .collect();
                out.push(create_text(&piece));
            }
            NodeData::Element { .. } => {
                let copy = shallow_clone(child);
                extend(&copy, slice_children(child, local_from, local_to));
                out.push(copy);
            }
            _ => {}
        }
    }
    out
}

fn extend(parent: &Handle, children: Vec<Handle>) {
    parent.children.borrow_mut().extend(children);
}

fn push_text(parent: &Handle, text: &str) {
    if !text.is_empty() {
        append(parent, create_text(text));
    }
}

fn placeholder_paragraph() -> Handle {
    let paragraph = create_element("p", vec![]);
    append(&paragraph, create_element("br", vec![]));
    paragraph
}

fn ensure_placeholder(block: &Handle) {
    if inline_len(block) > 0 {
        return;
    }
    let has_break = block
        .children
        .borrow()
        .iter()
        .any(|child| tag_name(child) == Some("br"));
    if !has_break {
        *block.children.borrow_mut() = vec![create_element("br", vec![])];
    }
}

fn replace_child(parent: &Handle, old: &Handle, new_nodes: Vec<Handle>) {
    let mut children = parent.children.borrow_mut();
    if let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, old)) {
        children.splice(position..=position, new_nodes);
    }
}

fn remove_child(parent: &Handle, old: &Handle) {
    parent
        .children
        .borrow_mut()
        .retain(|child| !Rc::ptr_eq(child, old));
}

/// Bring a freshly parsed body into the block-only shape.
fn normalize_root(root: &Handle) {
    let children: Vec<Handle> = root.children.borrow_mut().drain(..).collect();
    let mut blocks: Vec<Handle> = Vec::new();
    let mut loose: Option<Handle> = None;

    for child in children {
        if matches!(tag_name(&child), Some("ul" | "ol")) {
            loose = None;
            normalize_list(&child);
            if !child.children.borrow().is_empty() {
                blocks.push(child);
            }
        } else if is_block(&child) {
            loose = None;
            ensure_placeholder(&child);
            blocks.push(child);
        } else if matches!(child.data, NodeData::Text { .. } | NodeData::Element { .. }) {
            if loose.is_none() && is_blank_text(&child) {
                continue;
            }
            let paragraph = loose.get_or_insert_with(|| {
                let paragraph = create_element("p", vec![]);
                blocks.push(paragraph.clone());
                paragraph
            });
            append(paragraph, child);
        }
    }

    if blocks.is_empty() {
        blocks.push(placeholder_paragraph());
    }
    *root.children.borrow_mut() = blocks;
}

fn normalize_list(list: &Handle) {
    let children: Vec<Handle> = list.children.borrow_mut().drain(..).collect();
    let mut items = Vec::new();
    for child in children {
        if tag_name(&child) == Some("li") {
            ensure_placeholder(&child);
            items.push(child);
        } else if !is_blank_text(&child)
            && matches!(child.data, NodeData::Text { .. } | NodeData::Element { .. })
        {
            let item = create_element("li", vec![]);
            append(&item, child);
            items.push(item);
        }
    }
    *list.children.borrow_mut() = items;
}
