use tokio::sync::broadcast;
use tracing::trace;

use civic_types::events::Notice;

/// Fans mutation notices out to whoever renders them (toasts, CLI output).
/// Publishing with nobody listening is fine; the notice is dropped.
#[derive(Clone)]
pub struct Notices {
    tx: broadcast::Sender<Notice>,
}

impl Notices {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        trace!("notice: {:?}", notice);
        let _ = self.tx.send(notice);
    }
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(64)
    }
}
