//! Edit session controller.
//!
//! Owns the editor surface and the canonical Markdown buffer, and moves
//! between three states:
//!
//!     Idle --user edit--> Debouncing --deadline--> (serialize) --> Idle
//!     any  --external update--> Syncing --> Idle
//!     any  --clear--> Idle (placeholder, nothing emitted)
//!     any  --force submit--> (serialize) --> Idle
//!
//! Time is passed in by the caller. The controller exposes its debounce
//! deadline so an event loop can sleep until it and then call [`EditSession::poll`].

use crate::editor::{Debouncer, EditorSurface};
use crate::host::{ClientSignal, HostEvent};
use crate::upload::{CandidateFile, CaptureDecision, CaptureSource, Completion, ImageCapture};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default debounce delay between the last edit and serialization.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub debounce: Duration,
    /// Form field name reported with content changes
    pub field: String,
    /// Hint shown by the host while the editor is empty
    pub placeholder: String,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            field: "content".to_string(),
            placeholder: "Write something...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Debouncing,
    Syncing,
}

/// Result of reconciling an external content update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The update matched what this session last serialized
    Echo,
    /// The update was rendered into the surface
    Applied,
}

pub struct EditSession<S> {
    surface: S,
    options: SessionOptions,
    state: SessionState,
    debouncer: Debouncer,
    buffer: String,
    errors: Vec<String>,
}

impl<S: EditorSurface> EditSession<S> {
    /// Attach to a surface, rendering the initial content when it is not blank.
    pub fn mount(mut surface: S, initial: &str, options: SessionOptions) -> Self {
        if initial.trim().is_empty() {
            surface.clear();
        } else {
            surface.set_html(&crate::render(initial));
        }
        debug!(field = %options.field, len = surface.len(), "editor session mounted");

        Self {
            surface,
            debouncer: Debouncer::new(options.debounce),
            options,
            state: SessionState::Idle,
            buffer: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The last Markdown this session produced or accepted.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Move the cursor. Selection changes do not schedule serialization.
    pub fn select(&mut self, index: usize) {
        self.surface.set_selection(index);
    }

    /// When the pending serialization is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Mutate the surface as a user edit and schedule serialization.
    pub fn edit<R>(&mut self, now: Instant, apply: impl FnOnce(&mut S) -> R) -> R {
        let result = apply(&mut self.surface);
        self.user_edited(now);
        result
    }

    /// Note that the surface changed; restarts the debounce delay.
    pub fn user_edited(&mut self, now: Instant) {
        self.debouncer.restart(now);
        self.state = SessionState::Debouncing;
    }

    /// Serialize if the debounce deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        if self.debouncer.fire(now) {
            Some(self.commit())
        } else {
            None
        }
    }

    /// [`poll`](Self::poll), wrapped as the outbound change signal.
    pub fn poll_signal(&mut self, now: Instant) -> Option<ClientSignal> {
        self.poll(now).map(|content| self.content_changed(content))
    }

    /// Reconcile content pushed by the host.
    pub fn apply_external(&mut self, content: &str) -> SyncOutcome {
        self.state = SessionState::Syncing;
        if content == self.buffer {
            debug!("external update matches buffer, skipping render");
            self.state = SessionState::Idle;
            return SyncOutcome::Echo;
        }

        self.surface.set_html(&crate::render(content));
        if self.debouncer.cancel() {
            debug!("pending serialization dropped by external update");
        }
        self.buffer = content.to_string();
        self.state = SessionState::Idle;
        SyncOutcome::Applied
    }

    /// Reset the surface to the placeholder without emitting anything.
    ///
    /// The buffer is emptied with it, so the next host update is compared
    /// against the blank surface.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.buffer.clear();
        self.debouncer.cancel();
        self.state = SessionState::Idle;
    }

    /// Serialize immediately, bypassing any pending delay.
    pub fn force_submit(&mut self) -> String {
        self.debouncer.cancel();
        self.commit()
    }

    pub fn set_validation_errors(&mut self, errors: Vec<String>) {
        if !errors.is_empty() {
            debug!(count = errors.len(), "validation errors received");
        }
        self.errors = errors;
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.errors
    }

    /// Dispatch one host signal. Form submission answers with the content.
    pub fn handle_host_event(&mut self, event: HostEvent) -> Option<ClientSignal> {
        match event {
            HostEvent::ContentUpdate { content } => {
                self.apply_external(&content);
                None
            }
            HostEvent::ClearForm => {
                self.clear();
                None
            }
            HostEvent::FormSubmit => {
                let content = self.force_submit();
                Some(self.content_changed(content))
            }
            HostEvent::ValidationError { errors } => {
                self.set_validation_errors(errors);
                None
            }
            HostEvent::ImagesUploaded { files } => {
                debug!(
                    files = files.len(),
                    "upload replies belong to the uploader, ignoring"
                );
                None
            }
        }
    }

    /// Hand candidate files to the capture pipeline at the current cursor.
    ///
    /// Without a selection the cursor is the end of the document.
    pub fn capture_images(
        &mut self,
        capture: &mut ImageCapture,
        source: CaptureSource,
        files: Vec<CandidateFile>,
    ) -> CaptureDecision {
        let cursor = self
            .surface
            .selection()
            .unwrap_or_else(|| self.surface.len().saturating_sub(1));
        capture.capture(source, files, cursor, self.surface.revision())
    }

    /// Splice a finished upload into the surface.
    ///
    /// Returns the position the reference was inserted at, or `None` when the
    /// upload failed and the file was dropped.
    pub fn complete_upload(&mut self, completion: Completion, now: Instant) -> Option<usize> {
        let Completion { ticket, result } = completion;
        let reference = match result {
            Ok(reference) => reference,
            Err(err) => {
                warn!(
                    request_id = ticket.request_id,
                    filename = %ticket.filename,
                    error = %err,
                    "image upload failed, skipping"
                );
                return None;
            }
        };

        let position = ticket.position(&self.surface);
        let markdown = format!("![image]({reference})");
        self.surface.insert_text(position, &format!("{markdown}\n"));
        self.surface
            .set_selection(position + markdown.chars().count() + 1);
        debug!(
            request_id = ticket.request_id,
            position, "image reference inserted"
        );
        self.user_edited(now);
        Some(position)
    }

    fn commit(&mut self) -> String {
        let markdown = self.surface.to_markdown();
        self.buffer = markdown.clone();
        self.state = SessionState::Idle;
        debug!(bytes = markdown.len(), "content serialized");
        markdown
    }

    fn content_changed(&self, content: String) -> ClientSignal {
        ClientSignal::ContentChanged {
            field: self.options.field.clone(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::LiveDocument;

    fn session(initial: &str) -> EditSession<LiveDocument> {
        EditSession::mount(LiveDocument::new(), initial, SessionOptions::default())
    }

    #[test]
    fn mount_renders_non_blank_content() {
        let s = session("- [ ] milk");
        assert_eq!(
            s.surface().html(),
            r#"<p><input type="checkbox"> milk</p>"#
        );
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn mount_blank_shows_placeholder() {
        let s = session("  \n ");
        assert_eq!(s.surface().html(), "<p><br></p>");
    }

    #[test]
    fn burst_of_edits_serializes_once() {
        let start = Instant::now();
        let mut s = session("");
        s.edit(start, |doc| doc.insert_text(0, "a"));
        s.edit(start + Duration::from_millis(200), |doc| doc.insert_text(1, "b"));

        assert_eq!(s.state(), SessionState::Debouncing);
        assert_eq!(s.poll(start + Duration::from_millis(600)), None);
        assert_eq!(
            s.poll(start + Duration::from_millis(700)),
            Some("ab".to_string())
        );
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn echo_is_not_rendered() {
        let start = Instant::now();
        let mut s = session("");
        s.edit(start, |doc| doc.insert_text(0, "x"));
        let out = s.force_submit();
        let revision = s.surface().revision();

        assert_eq!(s.apply_external(&out), SyncOutcome::Echo);
        assert_eq!(s.surface().revision(), revision);
    }

    #[test]
    fn external_update_cancels_pending_debounce() {
        let start = Instant::now();
        let mut s = session("old");
        s.edit(start, |doc| doc.insert_text(0, "typed "));

        assert_eq!(s.apply_external("# New"), SyncOutcome::Applied);
        assert_eq!(s.deadline(), None);
        assert_eq!(s.poll(start + Duration::from_secs(1)), None);
        assert_eq!(s.surface().html(), "<h1>New</h1>");
        assert_eq!(s.buffer(), "# New");
    }

    #[test]
    fn clear_emits_nothing() {
        let start = Instant::now();
        let mut s = session("text");
        s.edit(start, |doc| doc.insert_text(0, "more "));
        s.clear();

        assert_eq!(s.poll(start + Duration::from_secs(1)), None);
        assert_eq!(s.surface().html(), "<p><br></p>");
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn content_is_restored_after_clear() {
        let mut s = session("draft");
        assert_eq!(s.force_submit(), "draft");
        s.clear();
        assert_eq!(s.buffer(), "");

        assert_eq!(s.apply_external("draft"), SyncOutcome::Applied);
        assert_eq!(s.surface().html(), "<p>draft</p>");
    }

    #[test]
    fn form_submit_reports_field_and_content() {
        let mut s = session("## Notes");
        let signal = s.handle_host_event(HostEvent::FormSubmit);
        assert_eq!(
            signal,
            Some(ClientSignal::ContentChanged {
                field: "content".to_string(),
                content: "## Notes".to_string(),
            })
        );
    }

    #[test]
    fn validation_errors_replace_previous_list() {
        let mut s = session("");
        s.handle_host_event(HostEvent::ValidationError {
            errors: vec!["can't be blank".to_string()],
        });
        assert_eq!(s.validation_errors(), ["can't be blank".to_string()]);
        s.handle_host_event(HostEvent::ValidationError { errors: vec![] });
        assert!(s.validation_errors().is_empty());
    }
}
