//! Live document editing

use quire_babel::editor::{EditorSurface, LiveDocument};

use crate::common::EDITOR_KITCHEN_SINK;

#[test]
fn test_typing_at_the_end_of_a_task() {
    let mut doc = LiveDocument::from_markdown("- [ ] milk");
    // checkbox + " milk"
    assert_eq!(doc.len(), 7);
    doc.insert_text(6, " and bread");
    assert_eq!(doc.to_markdown(), "- [ ] milk and bread");
}

#[test]
fn test_enter_in_a_list_adds_an_item() {
    let mut doc = LiveDocument::from_markdown("- a\n- b");
    doc.insert_text(3, "\nc");
    assert_eq!(doc.html(), "<ul><li>a</li><li>b</li><li>c</li></ul>");
    assert_eq!(doc.to_markdown(), "- a\n- b\n- c");
}

#[test]
fn test_enter_splits_a_paragraph() {
    let mut doc = LiveDocument::from_markdown("hello world");
    doc.insert_text(5, "\n");
    assert_eq!(doc.html(), "<p>hello</p><p> world</p>");
    assert_eq!(doc.block_count(), 2);
}

#[test]
fn test_toggle_task_flips_checkbox() {
    let mut doc = LiveDocument::from_markdown("- [ ] ship\n- [x] test");
    assert_eq!(doc.toggle_task(0), Some(true));
    assert_eq!(doc.toggle_task(1), Some(false));
    assert_eq!(doc.to_markdown(), "- [x] ship\n\n- [ ] test");
    assert_eq!(doc.toggle_task(5), None);
}

#[test]
fn test_deleting_everything_leaves_placeholder() {
    let mut doc = LiveDocument::from_markdown("first line\nsecond line");
    let len = doc.len();
    doc.delete_text(0, len);
    assert_eq!(doc.html(), "<p><br></p>");
    assert!(doc.is_empty());
    assert_eq!(doc.to_markdown(), "");
}

#[test]
fn test_editor_markup_reads_back() {
    let doc = LiveDocument::from_html(EDITOR_KITCHEN_SINK);
    let markdown = doc.to_markdown();
    assert!(markdown.starts_with("# Weekly plan"));
    assert!(markdown.contains("- [ ] write notes"));
}

#[test]
fn test_revision_counts_content_changes_only() {
    let mut doc = LiveDocument::from_markdown("text");
    let before = doc.revision();
    doc.set_selection(2);
    assert_eq!(doc.revision(), before);
    doc.insert_text(2, "x");
    assert!(doc.revision() > before);
}
