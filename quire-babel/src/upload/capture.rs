//! Capture of candidate files and the set of in-flight uploads.
//!
//! Each accepted image becomes its own local future; there is no queue and
//! no ordering between them. The session drains completions one at a time
//! through [`ImageCapture::next_completion`].

use crate::editor::EditorSurface;
use crate::error::UploadError;
use crate::upload::{
    CandidateFile, CaptureOptions, CaptureSource, CursorPolicy, PendingUpload, Uploader,
};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::rc::Rc;
use tracing::{debug, warn};

/// What the capture pipeline remembers about one accepted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub request_id: u64,
    pub filename: String,
    /// Cursor offset when the file was captured
    pub cursor: usize,
    /// Surface revision at capture time
    pub revision: u64,
    pub policy: CursorPolicy,
}

impl UploadTicket {
    /// Where the reference should be inserted on the surface as it is now.
    pub fn position<S: EditorSurface + ?Sized>(&self, surface: &S) -> usize {
        match self.policy {
            CursorPolicy::Offset => self.cursor,
            CursorPolicy::Anchored => surface.rebase(self.cursor, self.revision),
        }
    }
}

/// A finished upload, successful or not.
#[derive(Debug)]
pub struct Completion {
    pub ticket: UploadTicket,
    pub result: Result<String, UploadError>,
}

/// Outcome of offering a batch of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureDecision {
    /// Whether the host should suppress its default handling of the event
    pub intercept: bool,
    /// Request ids of the files sent for upload
    pub accepted: Vec<u64>,
    /// Files skipped as non-images or oversized
    pub rejected: usize,
}

pub struct ImageCapture {
    uploader: Rc<dyn Uploader>,
    options: CaptureOptions,
    next_request_id: u64,
    in_flight: FuturesUnordered<LocalBoxFuture<'static, Completion>>,
}

impl ImageCapture {
    pub fn new(uploader: Rc<dyn Uploader>, options: CaptureOptions) -> Self {
        Self {
            uploader,
            options,
            next_request_id: 1,
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /// Filter a batch and start one upload per accepted image.
    pub fn capture(
        &mut self,
        source: CaptureSource,
        files: Vec<CandidateFile>,
        cursor: usize,
        revision: u64,
    ) -> CaptureDecision {
        let mut decision = CaptureDecision::default();
        let mut saw_image = false;

        for file in files {
            let content_type = file.resolved_type();
            if !self.options.accepts(&content_type) {
                debug!(filename = %file.name, %content_type, "not an image, skipping");
                decision.rejected += 1;
                continue;
            }
            saw_image = true;

            let size = file.data.len();
            if self.options.max_bytes.is_some_and(|max| size > max) {
                warn!(filename = %file.name, size, "image exceeds size limit, skipping");
                decision.rejected += 1;
                continue;
            }

            let request_id = self.next_request_id;
            self.next_request_id += 1;

            let pending = PendingUpload {
                filename: file.name,
                content_type,
                size,
                data: file.data,
            };
            let request = pending.to_request(request_id);
            let ticket = UploadTicket {
                request_id,
                filename: pending.filename,
                cursor,
                revision,
                policy: self.options.cursor_policy,
            };
            debug!(request_id, filename = %ticket.filename, cursor, "upload started");

            let uploader = Rc::clone(&self.uploader);
            self.in_flight.push(
                async move {
                    let result = uploader.upload(request).await;
                    Completion { ticket, result }
                }
                .boxed_local(),
            );
            decision.accepted.push(request_id);
        }

        decision.intercept = source.always_intercepts() || saw_image;
        decision
    }

    /// Number of uploads not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Wait for whichever upload finishes next. `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.in_flight.next().await
    }
}
