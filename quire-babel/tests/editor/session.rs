//! Session synchronization

use std::time::{Duration, Instant};

use quire_babel::editor::{EditorSurface, SessionState, SyncOutcome};
use quire_babel::host::{ClientSignal, HostEvent};

use crate::common::session;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn test_typing_then_pausing_emits_one_change() {
    let start = Instant::now();
    let mut s = session("- [ ] milk");

    s.edit(start, |doc| doc.insert_text(6, " and"));
    s.edit(start + ms(300), |doc| doc.insert_text(10, " eggs"));

    assert_eq!(s.poll_signal(start + ms(500)), None);
    assert_eq!(
        s.poll_signal(start + ms(800)),
        Some(ClientSignal::ContentChanged {
            field: "content".to_string(),
            content: "- [ ] milk and eggs".to_string(),
        })
    );
    assert_eq!(s.buffer(), "- [ ] milk and eggs");
    assert_eq!(s.poll_signal(start + ms(5000)), None);
}

#[test]
fn test_echoed_update_keeps_the_cursor() {
    let start = Instant::now();
    let mut s = session("draft");
    s.edit(start, |doc| doc.insert_text(5, " two"));
    let content = s.poll(start + ms(600)).unwrap_or_default();

    s.select(3);
    let event: HostEvent =
        serde_json::from_value(serde_json::json!({"event": "content_update", "content": content}))
            .unwrap();
    assert_eq!(s.handle_host_event(event), None);
    assert_eq!(s.surface().selection(), Some(3));
    assert_eq!(s.state(), SessionState::Idle);
}

#[test]
fn test_external_update_wins_over_pending_edit() {
    let start = Instant::now();
    let mut s = session("local");
    s.edit(start, |doc| doc.insert_text(0, "typing "));
    assert_eq!(s.state(), SessionState::Debouncing);

    assert_eq!(s.apply_external("## Remote"), SyncOutcome::Applied);
    assert_eq!(s.poll(start + ms(1000)), None);
    assert_eq!(s.surface().html(), "<h2>Remote</h2>");
    assert_eq!(s.surface().to_markdown(), "## Remote");
}

#[test]
fn test_clear_form_resets_without_emitting() {
    let start = Instant::now();
    let mut s = session("- a\n- b");
    s.edit(start, |doc| doc.insert_text(0, "x"));

    let event: HostEvent = serde_json::from_str(r#"{"event":"clear_form"}"#).unwrap();
    assert_eq!(s.handle_host_event(event), None);
    assert_eq!(s.poll(start + ms(1000)), None);
    assert!(s.surface().is_empty());
}

#[test]
fn test_form_submit_flushes_pending_edit() {
    let start = Instant::now();
    let mut s = session("");
    s.edit(start, |doc| doc.insert_text(0, "quick note"));

    let event: HostEvent = serde_json::from_str(r#"{"event":"form_submit"}"#).unwrap();
    let signal = s.handle_host_event(event).unwrap();
    assert_eq!(
        serde_json::to_value(&signal).unwrap(),
        serde_json::json!({
            "event": "content_changed",
            "field": "content",
            "content": "quick note",
        })
    );
    assert_eq!(s.deadline(), None);
    assert_eq!(s.poll(start + ms(1000)), None);
}

#[test]
fn test_validation_errors_are_stored() {
    let mut s = session("");
    let event: HostEvent = serde_json::from_str(
        r#"{"event":"validation_error","errors":["is too short","needs a title"]}"#,
    )
    .unwrap();
    s.handle_host_event(event);
    assert_eq!(s.validation_errors().len(), 2);
}

#[test]
fn test_toggling_a_task_is_an_edit() {
    let start = Instant::now();
    let mut s = session("- [ ] ship it");
    assert_eq!(s.edit(start, |doc| doc.toggle_task(0)), Some(true));
    assert_eq!(s.poll(start + ms(500)).as_deref(), Some("- [x] ship it"));
}
