//! Defines the flat event stream representation of a document.
//!
//! Blocks are positional; lists are expressed as `StartList`/`EndList`
//! markers around a contiguous run of items. The Markdown parser emits
//! events directly (a blank line ends a run), while documents built in
//! memory derive their runs from adjacent items of the same kind.

use crate::ir::nodes::{Block, Document, ListKind};

/// Represents a single event in the document stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartList(ListKind),
    EndList,
    Block(Block),
}

/// Incremental builder that opens and closes list runs around items.
#[derive(Debug, Default)]
pub struct EventWriter {
    events: Vec<Event>,
    open: Option<ListKind>,
}

impl EventWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a block, switching list runs when its kind differs from the open one.
    pub fn push_block(&mut self, block: Block) {
        let kind = block.list_kind();
        if self.open.is_some() && self.open != kind {
            self.close_list();
        }
        if let Some(kind) = kind {
            if self.open.is_none() {
                self.events.push(Event::StartList(kind));
                self.open = Some(kind);
            }
        }
        self.events.push(Event::Block(block));
    }

    /// Ends the open list run, if any.
    pub fn close_list(&mut self) {
        if self.open.take().is_some() {
            self.events.push(Event::EndList);
        }
    }

    pub fn finish(mut self) -> Vec<Event> {
        self.close_list();
        self.events
    }
}

/// Derives the event stream for a document, grouping adjacent list items.
pub fn document_to_events(doc: &Document) -> Vec<Event> {
    let mut writer = EventWriter::new();
    for block in &doc.blocks {
        writer.push_block(block.clone());
    }
    writer.finish()
}

/// Collects the blocks of an event stream, dropping list markers.
pub fn events_to_document(events: &[Event]) -> Document {
    let blocks = events
        .iter()
        .filter_map(|event| match event {
            Event::Block(block) => Some(block.clone()),
            _ => None,
        })
        .collect();
    Document { blocks }
}
