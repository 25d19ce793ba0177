//! Delivery of idle-timeout expirations.

use aaa_core::AaaContext;
use tokio::sync::mpsc;
use tracing::warn;

/// Receives the context of a session the table has just expired.
///
/// Called at most once per session, after the session has been removed.
pub trait TimeoutNotifier: Send + Sync {
    fn notify(&self, ctx: AaaContext);
}

/// An expired session, as queued for the accounting service.
#[derive(Debug, Clone)]
pub struct TimeoutEvent {
    pub ctx: AaaContext,
}

pub type TimeoutReceiver = mpsc::UnboundedReceiver<TimeoutEvent>;

/// Notifier that queues expirations for a consumer task.
#[derive(Debug, Clone)]
pub struct TimeoutQueue {
    tx: mpsc::UnboundedSender<TimeoutEvent>,
}

/// Creates a timeout queue and the receiver its consumer drains.
pub fn timeout_queue() -> (TimeoutQueue, TimeoutReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TimeoutQueue { tx }, rx)
}

impl TimeoutNotifier for TimeoutQueue {
    fn notify(&self, ctx: AaaContext) {
        let session_id = ctx.session_id.clone();
        if self.tx.send(TimeoutEvent { ctx }).is_err() {
            warn!(session_id = %session_id, "Timeout queue closed, dropping expired session");
        }
    }
}
