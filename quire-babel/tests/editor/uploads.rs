//! Image capture and out-of-order upload completion

use std::time::{Duration, Instant};

use quire_babel::editor::{EditSession, EditorSurface, LiveDocument};
use quire_babel::host::ClientSignal;
use quire_babel::upload::{
    CaptureOptions, CaptureSource, CursorPolicy, HostUploader, ImageCapture, UploadOutcome,
    UploadReply,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::common::{png, session};

fn uploaded(filename: &str, url: &str) -> UploadReply {
    UploadReply {
        request_id: None,
        filename: Some(filename.to_string()),
        outcome: UploadOutcome::Uploaded {
            url: url.to_string(),
        },
    }
}

/// Capture `a.png` at `a_at`, then `b.png` at `b_at`.
fn capture_two(
    s: &mut EditSession<LiveDocument>,
    capture: &mut ImageCapture,
    a_at: usize,
    b_at: usize,
) {
    s.select(a_at);
    let decision = s.capture_images(capture, CaptureSource::Drop, vec![png("a.png")]);
    assert!(decision.intercept);
    s.select(b_at);
    s.capture_images(capture, CaptureSource::Drop, vec![png("b.png")]);
    assert_eq!(capture.in_flight(), 2);
}

/// Answer both uploads, `b.png` first, letting the session consume it before `a.png`.
async fn host(uploader: &HostUploader, signals: &mut UnboundedReceiver<ClientSignal>) {
    let mut requested = Vec::new();
    while requested.len() < 2 {
        match signals.recv().await {
            Some(ClientSignal::UploadImage(request)) => requested.push(request.filename),
            Some(_) => {}
            None => break,
        }
    }
    requested.sort();
    assert_eq!(requested, ["a.png", "b.png"]);

    assert_eq!(uploader.resolve(vec![uploaded("b.png", "/u/b.png")]), 1);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(uploader.resolve(vec![uploaded("a.png", "/u/a.png")]), 1);
}

async fn drain(s: &mut EditSession<LiveDocument>, capture: &mut ImageCapture) -> Vec<String> {
    let mut order = Vec::new();
    while let Some(completion) = capture.next_completion().await {
        order.push(completion.ticket.filename.clone());
        s.complete_upload(completion, Instant::now());
    }
    order
}

#[tokio::test]
async fn test_out_of_order_completions_use_their_own_cursor() {
    let (uploader, mut signals) = HostUploader::channel();
    let mut capture = ImageCapture::new(uploader.clone(), CaptureOptions::default());
    // "alpha" occupies 0..5, "omega" starts at 6
    let mut s = session("alpha\n\nomega");
    capture_two(&mut s, &mut capture, 0, 6);

    let (order, ()) = tokio::join!(
        drain(&mut s, &mut capture),
        host(&uploader, &mut signals)
    );

    assert_eq!(order, ["b.png", "a.png"]);
    assert_eq!(
        s.force_submit(),
        "![image](/u/a.png)\n\nalpha\n\n![image](/u/b.png)\n\nomega"
    );
}

#[tokio::test]
async fn test_anchored_cursor_follows_earlier_insertions() {
    let (uploader, mut signals) = HostUploader::channel();
    let options = CaptureOptions {
        cursor_policy: CursorPolicy::Anchored,
        ..CaptureOptions::default()
    };
    let mut capture = ImageCapture::new(uploader.clone(), options);
    let mut s = session("alpha\n\nomega");
    capture_two(&mut s, &mut capture, 6, 0);

    let (order, ()) = tokio::join!(
        drain(&mut s, &mut capture),
        host(&uploader, &mut signals)
    );

    assert_eq!(order, ["b.png", "a.png"]);
    assert_eq!(
        s.force_submit(),
        "![image](/u/b.png)\n\nalpha\n\n![image](/u/a.png)\n\nomega"
    );
}

#[tokio::test]
async fn test_failed_upload_is_skipped() {
    let (uploader, mut signals) = HostUploader::channel();
    let mut capture = ImageCapture::new(uploader.clone(), CaptureOptions::default());
    let mut s = session("note");
    s.select(4);
    s.capture_images(&mut capture, CaptureSource::Paste, vec![png("big.png")]);

    let reply = async {
        let request = match signals.recv().await {
            Some(ClientSignal::UploadImage(request)) => request,
            other => panic!("expected an upload request, got {other:?}"),
        };
        uploader.resolve(vec![UploadReply {
            request_id: Some(request.request_id),
            filename: None,
            outcome: UploadOutcome::Failed {
                error: "too large".to_string(),
            },
        }]);
    };
    let completion = async {
        let completion = capture.next_completion().await.unwrap();
        s.complete_upload(completion, Instant::now())
    };
    let (inserted, ()) = tokio::join!(completion, reply);

    assert_eq!(inserted, None);
    assert_eq!(s.surface().to_markdown(), "note");
}

#[test]
fn test_non_images_are_left_to_the_host() {
    let (uploader, _signals) = HostUploader::channel();
    let mut capture = ImageCapture::new(uploader, CaptureOptions::default());
    let mut s = session("");
    let text = quire_babel::upload::CandidateFile::new(
        "notes.txt",
        Some("text/plain".to_string()),
        b"hello".to_vec(),
    );

    let decision = s.capture_images(&mut capture, CaptureSource::Paste, vec![text]);
    assert!(!decision.intercept);
    assert!(decision.accepted.is_empty());
    assert_eq!(capture.in_flight(), 0);
}

#[tokio::test]
async fn test_inserted_reference_moves_the_cursor_and_schedules_sync() {
    let (uploader, mut signals) = HostUploader::channel();
    let mut capture = ImageCapture::new(uploader.clone(), CaptureOptions::default());
    let mut s = session("alpha\n\nomega");
    s.select(6);
    s.capture_images(&mut capture, CaptureSource::Toolbar, vec![png("c.png")]);

    let reply = async {
        signals.recv().await;
        uploader.resolve(vec![uploaded("c.png", "/u/c.png")]);
    };
    let completion = async {
        let completion = capture.next_completion().await.unwrap();
        s.complete_upload(completion, Instant::now())
    };
    let (inserted, ()) = tokio::join!(completion, reply);

    assert_eq!(inserted, Some(6));
    // "![image](/u/c.png)" plus the newline
    assert_eq!(s.surface().selection(), Some(25));
    assert!(s.deadline().is_some());
}
