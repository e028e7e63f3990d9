//! Session replay
//!
//! Drives an [`EditSession`] over a [`LiveDocument`] from a JSON-lines script,
//! one step per line:
//!
//! ```text
//! {"action":"type","text":"hello"}
//! {"action":"select","at":0}
//! {"action":"capture","source":"drop","files":[{"name":"a.png","path":"a.png","delay_ms":40}]}
//! {"action":"wait","ms":600}
//! {"action":"host","signal":{"event":"form_submit"}}
//! ```
//!
//! Uploads go to a [`LocalDirUploader`]. Every signal the session sends to the
//! host is written as one JSON line. After the last step the runner waits for
//! outstanding uploads and the pending debounce before returning.

use base64::{engine::general_purpose::STANDARD, Engine};
use quire_babel::editor::{EditSession, EditorSurface, LiveDocument};
use quire_babel::host::{ClientSignal, HostEvent};
use quire_babel::upload::{CandidateFile, CaptureSource, ImageCapture, UploadRequest, Uploader};
use quire_babel::UploadError;
use quire_config::QuireConfig;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("file '{name}': {reason}")]
    File { name: String, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Type text at `at`, or at the cursor when omitted
    Type {
        #[serde(default)]
        at: Option<usize>,
        text: String,
    },
    Delete {
        at: usize,
        len: usize,
    },
    Select {
        at: usize,
    },
    /// Click the checkbox of a task block
    Toggle {
        block: usize,
    },
    Capture {
        #[serde(default = "toolbar")]
        source: CaptureSource,
        files: Vec<FileSpec>,
    },
    Wait {
        ms: u64,
    },
    Host {
        signal: HostEvent,
    },
}

fn toolbar() -> CaptureSource {
    CaptureSource::Toolbar
}

/// A file offered in a capture step. Bytes come from `path` (relative to the
/// script) or from inline base64 `data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileSpec {
    pub name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub data: Option<String>,
    /// Simulated upload latency
    #[serde(default)]
    pub delay_ms: u64,
}

impl FileSpec {
    fn load(&self, base: &Path) -> Result<CandidateFile, ReplayError> {
        let bytes = match (&self.path, &self.data) {
            (Some(path), _) => std::fs::read(base.join(path)).map_err(|e| ReplayError::File {
                name: self.name.clone(),
                reason: e.to_string(),
            })?,
            (None, Some(data)) => STANDARD.decode(data).map_err(|e| ReplayError::File {
                name: self.name.clone(),
                reason: e.to_string(),
            })?,
            (None, None) => {
                return Err(ReplayError::File {
                    name: self.name.clone(),
                    reason: "needs a path or inline data".to_string(),
                })
            }
        };
        Ok(CandidateFile::new(&self.name, self.content_type.clone(), bytes))
    }
}

/// Parse a JSON-lines script. Blank lines and `//` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<Step>, ReplayError> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with("//")
        })
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Script { line: i + 1, source })
        })
        .collect()
}

/// Stores uploads as files in a directory and answers with `url_prefix/name`.
pub struct LocalDirUploader {
    dir: PathBuf,
    url_prefix: String,
    latency: RefCell<HashMap<String, Duration>>,
}

impl LocalDirUploader {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
            latency: RefCell::new(HashMap::new()),
        }
    }

    /// Delay the upload of `filename` by `delay`.
    pub fn set_latency(&self, filename: &str, delay: Duration) {
        self.latency.borrow_mut().insert(filename.to_string(), delay);
    }

    fn stored_name(request: &UploadRequest) -> String {
        let safe: String = request
            .filename
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        format!("{}-{safe}", request.request_id)
    }
}

#[async_trait::async_trait(?Send)]
impl Uploader for LocalDirUploader {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        let bytes = request.decode()?;
        let delay = self.latency.borrow().get(&request.filename).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let name = Self::stored_name(&request);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;
        debug!(request_id = request.request_id, %name, "image stored");

        Ok(format!("{}/{name}", self.url_prefix.trim_end_matches('/')))
    }
}

enum Wake {
    Upload(quire_babel::upload::Completion),
    Timer,
}

/// Replays a script against one editor session.
pub struct Replay<W> {
    session: EditSession<LiveDocument>,
    capture: ImageCapture,
    uploader: Rc<LocalDirUploader>,
    base: PathBuf,
    out: W,
}

impl<W: Write> Replay<W> {
    /// Mount a session over `initial` configured from `config`. File paths in
    /// the script resolve against `base`.
    pub fn new(config: &QuireConfig, initial: &str, base: impl Into<PathBuf>, out: W) -> Self {
        let uploader = Rc::new(LocalDirUploader::new(
            config.upload.dir.clone(),
            config.upload.url_prefix.clone(),
        ));
        let capture = ImageCapture::new(uploader.clone(), (&config.images).into());
        let session = EditSession::mount(LiveDocument::new(), initial, (&config.session).into());
        Self {
            session,
            capture,
            uploader,
            base: base.into(),
            out,
        }
    }

    pub fn session(&self) -> &EditSession<LiveDocument> {
        &self.session
    }

    /// Run every step, then settle. Returns the final Markdown buffer.
    pub async fn run(&mut self, steps: Vec<Step>) -> Result<String, ReplayError> {
        for step in steps {
            self.step(step).await?;
        }
        self.drive(None).await?;
        info!(bytes = self.session.buffer().len(), "replay finished");
        Ok(self.session.buffer().to_string())
    }

    async fn step(&mut self, step: Step) -> Result<(), ReplayError> {
        debug!(?step, "replay step");
        match step {
            Step::Type { at, text } => {
                let surface = self.session.surface();
                let at = at
                    .or(surface.selection())
                    .unwrap_or_else(|| surface.len().saturating_sub(1));
                self.session
                    .edit(Instant::now(), |doc| doc.insert_text(at, &text));
                self.session.select(at + text.chars().count());
            }
            Step::Delete { at, len } => {
                self.session
                    .edit(Instant::now(), |doc| doc.delete_text(at, len));
                self.session.select(at);
            }
            Step::Select { at } => self.session.select(at),
            Step::Toggle { block } => {
                self.session
                    .edit(Instant::now(), |doc| doc.toggle_task(block));
            }
            Step::Capture { source, files } => {
                let mut candidates = Vec::with_capacity(files.len());
                for spec in &files {
                    if spec.delay_ms > 0 {
                        self.uploader
                            .set_latency(&spec.name, Duration::from_millis(spec.delay_ms));
                    }
                    candidates.push(spec.load(&self.base)?);
                }
                let decision = self
                    .session
                    .capture_images(&mut self.capture, source, candidates);
                debug!(
                    accepted = decision.accepted.len(),
                    rejected = decision.rejected,
                    "files captured"
                );
            }
            Step::Wait { ms } => {
                self.drive(Some(Instant::now() + Duration::from_millis(ms)))
                    .await?;
            }
            Step::Host { signal } => {
                if let Some(reply) = self.session.handle_host_event(signal) {
                    self.emit(&reply)?;
                }
            }
        }
        Ok(())
    }

    /// Process upload completions and debounce deadlines until `until`, or
    /// until nothing is pending when `until` is `None`.
    async fn drive(&mut self, until: Option<Instant>) -> Result<(), ReplayError> {
        loop {
            let deadline = self.session.deadline();
            if until.is_none() && deadline.is_none() && self.capture.in_flight() == 0 {
                return Ok(());
            }
            let wake_at = [deadline, until].into_iter().flatten().min();
            let uploading = self.capture.in_flight() > 0;

            let wake = tokio::select! {
                Some(completion) = self.capture.next_completion(), if uploading => Wake::Upload(completion),
                _ = sleep_until(wake_at) => Wake::Timer,
            };

            match wake {
                Wake::Upload(completion) => {
                    self.session.complete_upload(completion, Instant::now());
                }
                Wake::Timer => {
                    let now = Instant::now();
                    if let Some(signal) = self.session.poll_signal(now) {
                        self.emit(&signal)?;
                    }
                    if until.is_some_and(|until| now >= until) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn emit(&mut self, signal: &ClientSignal) -> Result<(), ReplayError> {
        serde_json::to_writer(&mut self.out, signal)?;
        writeln!(self.out)?;
        Ok(())
    }
}

async fn sleep_until(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}
