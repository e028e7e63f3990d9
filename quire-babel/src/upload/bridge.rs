//! Uploader that round-trips through the host's signal channel.
//!
//! Each request goes out as an `upload_image` signal; the matching entry of a
//! later `images_uploaded` event resolves it. Entries carrying a `request_id`
//! are matched exactly, older hosts that only echo the filename are matched to
//! the oldest waiting request with that name.

use crate::error::UploadError;
use crate::host::ClientSignal;
use crate::upload::{UploadOutcome, UploadReply, UploadRequest, Uploader};
use async_trait::async_trait;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

struct Waiter {
    filename: String,
    reply: oneshot::Sender<UploadOutcome>,
}

pub struct HostUploader {
    outbound: mpsc::UnboundedSender<ClientSignal>,
    waiting: RefCell<BTreeMap<u64, Waiter>>,
}

impl HostUploader {
    /// Create the uploader together with the stream of signals it emits.
    pub fn channel() -> (Rc<Self>, mpsc::UnboundedReceiver<ClientSignal>) {
        let (outbound, signals) = mpsc::unbounded_channel();
        let uploader = Rc::new(Self {
            outbound,
            waiting: RefCell::new(BTreeMap::new()),
        });
        (uploader, signals)
    }

    /// Requests still waiting for a reply.
    pub fn pending(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Deliver the entries of an `images_uploaded` event. Returns how many matched.
    pub fn resolve(&self, replies: Vec<UploadReply>) -> usize {
        let mut matched = 0;
        for reply in replies {
            let waiter = {
                let mut waiting = self.waiting.borrow_mut();
                let key = match (reply.request_id, reply.filename.as_deref()) {
                    (Some(id), _) => Some(id),
                    (None, Some(name)) => waiting
                        .iter()
                        .find(|(_, waiter)| waiter.filename == name)
                        .map(|(id, _)| *id),
                    (None, None) => waiting.keys().next().copied(),
                };
                key.and_then(|id| waiting.remove(&id))
            };

            match waiter {
                Some(waiter) => {
                    // The capture side may have been dropped; nothing to deliver then
                    if waiter.reply.send(reply.outcome).is_ok() {
                        matched += 1;
                    }
                }
                None => warn!(
                    request_id = ?reply.request_id,
                    filename = ?reply.filename,
                    "upload reply matches no pending request"
                ),
            }
        }
        matched
    }
}

#[async_trait(?Send)]
impl Uploader for HostUploader {
    async fn upload(&self, request: UploadRequest) -> Result<String, UploadError> {
        let (reply, response) = oneshot::channel();
        let request_id = request.request_id;
        self.waiting.borrow_mut().insert(
            request_id,
            Waiter {
                filename: request.filename.clone(),
                reply,
            },
        );

        if self.outbound.send(ClientSignal::UploadImage(request)).is_err() {
            self.waiting.borrow_mut().remove(&request_id);
            return Err(UploadError::Disconnected);
        }
        debug!(request_id, "upload_image signal sent");

        match response.await {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(UploadError::Disconnected),
        }
    }
}
