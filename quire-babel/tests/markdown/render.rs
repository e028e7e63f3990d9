//! Rendering tests (Markdown → editor HTML)

use insta::assert_snapshot;
use quire_babel::render;

#[test]
fn test_unchecked_task() {
    assert_eq!(
        render("- [ ] buy milk"),
        r#"<p><input type="checkbox"> buy milk</p>"#
    );
}

#[test]
fn test_checked_task_is_case_insensitive() {
    for source in ["- [x] DONE", "- [X] DONE"] {
        assert_eq!(
            render(source),
            r#"<p><input type="checkbox" checked=""> DONE</p>"#,
            "source {source:?}"
        );
    }
}

#[test]
fn test_image_line() {
    assert_eq!(
        render("![cat](https://x/y.png)"),
        r#"<p><img src="https://x/y.png" alt="cat"></p>"#
    );
}

#[test]
fn test_three_bullets_share_one_list() {
    assert_eq!(
        render("- one\n- two\n- three\nafter"),
        "<ul><li>one</li><li>two</li><li>three</li></ul><p>after</p>"
    );
}

#[test]
fn test_blank_line_closes_list() {
    assert_eq!(
        render("- a\n\n- b"),
        "<ul><li>a</li></ul><ul><li>b</li></ul>"
    );
}

#[test]
fn test_list_kind_change_closes_list() {
    assert_eq!(
        render("- a\n1. b\n2. c\n- d"),
        "<ul><li>a</li></ul><ol><li>b</li><li>c</li></ol><ul><li>d</li></ul>"
    );
}

#[test]
fn test_blank_input_renders_placeholder() {
    assert_eq!(render(""), "<p><br></p>");
    assert_eq!(render("   \n\t\n  "), "<p><br></p>");
}

#[test]
fn test_malformed_lines_degrade_to_paragraphs() {
    assert_eq!(
        render("![broken](\n#nospace\n1.x\n[y] maybe"),
        "<p>![broken](</p><p>#nospace</p><p>1.x</p><p>[y] maybe</p>"
    );
}

#[test]
fn test_text_is_html_escaped() {
    assert_eq!(render("a < b & c"), "<p>a &lt; b &amp; c</p>");
}

#[test]
fn test_kitchen_sink() {
    let source = "# Title\n## Sub\nSome **bold** and *it* and `code`.\n- [x] done\n![](u.png)\n1. one\n2. two";
    assert_snapshot!(
        render(source),
        @r#"<h1>Title</h1><h2>Sub</h2><p>Some <strong>bold</strong> and <em>it</em> and <code>code</code>.</p><p><input type="checkbox" checked=""> done</p><p><img src="u.png" alt="image"></p><ol><li>one</li><li>two</li></ol>"#
    );
}
