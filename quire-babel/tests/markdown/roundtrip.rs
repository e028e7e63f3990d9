//! Round-trip properties (Markdown → HTML → Markdown)
//!
//! Lenient input may be rewritten once; after that the canonical form must be
//! a fixed point.

use proptest::prelude::*;
use quire_babel::transforms::{check_stability, roundtrip};
use quire_babel::{parse, render, serialize_html};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn words() -> impl Strategy<Value = String> {
    prop::collection::vec(word(), 1..4).prop_map(|words| words.join(" "))
}

fn line() -> impl Strategy<Value = String> {
    prop_oneof![
        words().prop_map(|w| format!("# {w}")),
        words().prop_map(|w| format!("## {w}")),
        (any::<bool>(), words())
            .prop_map(|(done, w)| format!("- [{}] {w}", if done { "x" } else { " " })),
        word().prop_map(|w| format!("![shot](https://img.test/{w}.png)")),
        (word(), words()).prop_map(|(w, c)| format!("![shot](https://img.test/{w}.png) {c}")),
        words().prop_map(|w| format!("### {w}")),
        words().prop_map(|w| format!("> {w}")),
        words().prop_map(|w| format!("- {w}")),
        (1u8..20, words()).prop_map(|(n, w)| format!("{n}. {w}")),
        words(),
        (word(), words()).prop_map(|(b, w)| format!("**{b}** {w}")),
        (word(), words()).prop_map(|(i, w)| format!("{w} *{i}*")),
        (word(), words()).prop_map(|(c, w)| format!("`{c}` {w}")),
        Just(String::new()),
    ]
}

fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(line(), 0..12).prop_map(|lines| lines.join("\n"))
}

/// Editor markup for constructs the line grammar has no direct form for.
fn editor_block() -> impl Strategy<Value = String> {
    prop_oneof![
        words().prop_map(|w| format!("<p>{w}</p>")),
        (2u8..7, words()).prop_map(|(level, w)| format!("<h{level}>{w}</h{level}>")),
        words().prop_map(|w| format!("<blockquote><p>{w}</p></blockquote>")),
        (word(), words()).prop_map(|(w, c)| format!(r#"<p><img src="/u/{w}.png"> {c}</p>"#)),
        (words(), word()).prop_map(|(c, w)| format!(r#"<p>{c} <img src="/u/{w}.png"></p>"#)),
        (word(), word()).prop_map(|(a, b)| format!("<p><code>{a}`{b}</code></p>")),
        (word(), words()).prop_map(|(s, w)| format!("<p><s>{s}</s> {w}</p>")),
    ]
}

fn editor_html() -> impl Strategy<Value = String> {
    prop::collection::vec(editor_block(), 1..6).prop_map(|blocks| blocks.concat())
}

fn kinds(markdown: &str) -> Vec<&'static str> {
    parse(markdown)
        .blocks
        .iter()
        .map(|block| block.kind_name())
        .collect()
}

proptest! {
    #[test]
    fn test_canonical_form_is_a_fixed_point(source in document()) {
        let canonical = roundtrip(&source);
        prop_assert_eq!(roundtrip(&canonical), canonical);
    }

    #[test]
    fn test_block_kinds_survive(source in document()) {
        prop_assert_eq!(kinds(&roundtrip(&source)), kinds(&source));
    }

    #[test]
    fn test_editor_markup_serializes_to_a_fixed_point(html in editor_html()) {
        let markdown = serialize_html(&html);
        prop_assert_eq!(serialize_html(&render(&markdown)), markdown);
    }

    #[test]
    fn test_serialization_is_deterministic(source in document()) {
        let html = render(&source);
        prop_assert_eq!(serialize_html(&html), serialize_html(&html));
    }
}

#[test]
fn test_lenient_numbered_task_is_canonicalized() {
    let report = check_stability("1. [ ] call back\n\n\n\nnext");
    assert_eq!(report.first, "- [ ] call back\n\nnext");
    assert!(report.is_stable());
    assert!(!report.is_canonical("1. [ ] call back\n\n\n\nnext"));
}

#[test]
fn test_editor_only_constructs_read_back() {
    for html in [
        r#"<p><img src="/u/a.png"> caption</p>"#,
        "<blockquote><p>quoted</p></blockquote>",
        "<h3>deep</h3>",
        "<p><code>a`b</code></p>",
    ] {
        let markdown = serialize_html(html);
        assert_eq!(serialize_html(&render(&markdown)), markdown, "html {html}");
    }
}

#[test]
fn test_canonical_document_is_untouched() {
    let source = "# Plan\n\n- [x] draft\n\n- [ ] review\n\n- one\n- two\n\n![image](/uploads/a.png)";
    let report = check_stability(source);
    assert!(report.is_canonical(source), "{:?}", report.differences());
}
