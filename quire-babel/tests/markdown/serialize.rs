//! Serialization tests (editor HTML → Markdown)

use comrak::nodes::NodeValue;
use comrak::{parse_document, Arena, Options};
use quire_babel::formats::markdown::normalize::normalize;
use quire_babel::{render, serialize_html};

use crate::common::EDITOR_KITCHEN_SINK;

/// Collect the top-level Comrak block kinds of a Markdown string.
fn block_kinds(markdown: &str) -> Vec<&'static str> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &Options::default());
    root.children()
        .map(|child| match child.data.borrow().value {
            NodeValue::Heading(_) => "Heading",
            NodeValue::Paragraph => "Paragraph",
            NodeValue::List(_) => "List",
            _ => "Other",
        })
        .collect()
}

#[test]
fn test_task_items() {
    assert_eq!(
        serialize_html(r#"<p><input type="checkbox"> buy milk</p>"#),
        "- [ ] buy milk"
    );
    assert_eq!(
        serialize_html(r#"<p><input type="checkbox" checked=""> DONE</p>"#),
        "- [x] DONE"
    );
}

#[test]
fn test_image_alt_is_not_preserved() {
    assert_eq!(
        serialize_html(&render("![cat](https://x/y.png)")),
        "![image](https://x/y.png)"
    );
}

#[test]
fn test_numbered_checkbox_artifacts() {
    assert_eq!(
        serialize_html(r#"<ol><li><input type="checkbox"> task</li></ol>"#),
        "- [ ] task"
    );
    assert_eq!(serialize_html("<ol><li>[ ] task</li></ol>"), "- [ ] task");
    assert_eq!(normalize("1. [ ] task"), "- [ ] task");
    assert_eq!(normalize("2. - [x] task"), "- [x] task");
}

#[test]
fn test_kitchen_sink_structure() {
    let markdown = serialize_html(EDITOR_KITCHEN_SINK);

    assert!(markdown.starts_with("# Weekly plan\n\n"), "{markdown}");
    assert!(markdown.contains("Some **bold** and *soft* words with `code`."));
    assert!(markdown.contains("- [x] ship the release\n\n- [ ] write notes"));
    assert!(markdown.contains("- apples\n- pears"));
    assert!(markdown.contains("1. first\n2. second"));
    assert!(markdown.ends_with("![image](/uploads/board.png)"));
    assert!(!markdown.contains('\\'), "unexpected escapes in {markdown}");
}

#[test]
fn test_output_parses_as_commonmark_blocks() {
    let markdown = serialize_html("<h2>Sub</h2><p>text</p><ul><li>a</li></ul>");
    assert_eq!(block_kinds(&markdown), vec!["Heading", "Paragraph", "List"]);
}

#[test]
fn test_punctuation_survives_a_round_trip() {
    for html in [
        "<p>2 * 3 = 6</p>",
        "<p>snake_case_name</p>",
        "<p># not a heading</p>",
    ] {
        assert_eq!(render(&serialize_html(html)), html, "html {html}");
    }
}

#[test]
fn test_empty_editor_serializes_to_nothing() {
    assert_eq!(serialize_html("<p><br></p>"), "");
    assert_eq!(serialize_html(""), "");
}

#[test]
fn test_toolbar_extras() {
    assert_eq!(
        serialize_html(r#"<p>see <a href="https://example.com">the site</a></p>"#),
        "see [the site](https://example.com)"
    );
    assert_eq!(serialize_html("<h3>Deep</h3>"), "## Deep");
    assert_eq!(serialize_html("<p>x<u>under</u>y</p>"), "xundery");
    assert_eq!(serialize_html("<p><s>gone</s> text</p>"), "~~gone~~ text");
    assert_eq!(
        serialize_html("<pre>let x = 1;\nlet y = 2;</pre>"),
        "```\nlet x = 1;\nlet y = 2;\n```"
    );
    assert_eq!(
        serialize_html("<blockquote><p>quoted</p></blockquote>"),
        "quoted"
    );
}

#[test]
fn test_image_captions_become_paragraphs() {
    let html = r#"<p><img src="/u/a.png"> caption</p>"#;
    let markdown = serialize_html(html);
    assert_eq!(markdown, "![image](/u/a.png)\n\ncaption");
    assert_eq!(serialize_html(&render(&markdown)), markdown);
}

#[test]
fn test_serialization_is_deterministic() {
    let first = serialize_html(EDITOR_KITCHEN_SINK);
    let second = serialize_html(EDITOR_KITCHEN_SINK);
    assert_eq!(first, second);
}
