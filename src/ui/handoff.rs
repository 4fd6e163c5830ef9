/// Hand-off from pipeline tasks to the viewer
///
/// Background tasks never touch the UI. They post a `ShowRequest` on an
/// unbounded channel and move on; the viewer drains the channel on its own
/// thread each tick and only shows the newest request.

use std::path::PathBuf;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// A finished artifact ready to be displayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowRequest {
    pub path: PathBuf,
}

/// Sending half, cloned into every pipeline task
#[derive(Debug, Clone)]
pub struct PresenterHandle {
    tx: UnboundedSender<ShowRequest>,
}

impl PresenterHandle {
    /// Fire-and-forget; a closed viewer just drops the request.
    pub fn notify(&self, path: PathBuf) {
        if let Err(err) = self.tx.send(ShowRequest { path }) {
            debug!(path = %err.0.path.display(), "viewer is gone, dropping show request");
        }
    }
}

/// Receiving half, owned by the viewer
#[derive(Debug)]
pub struct PresenterInbox {
    rx: UnboundedReceiver<ShowRequest>,
}

impl PresenterInbox {
    /// Take everything pending and keep the most recent (last write wins)
    pub fn drain_latest(&mut self) -> Option<ShowRequest> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(request) => latest = Some(request),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }
}

pub fn channel() -> (PresenterHandle, PresenterInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PresenterHandle { tx }, PresenterInbox { rx })
}
