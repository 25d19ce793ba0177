//! Session table for the AAA accounting service.
//!
//! Holds every live [`Session`] keyed by RADIUS session id, with a secondary
//! index by IMSI, and owns the per-session idle timers. Expired sessions are
//! handed to a [`TimeoutNotifier`], normally the [`TimeoutQueue`] drained by
//! the accounting service.

mod notifier;
mod session;
mod table;

pub use notifier::{timeout_queue, TimeoutEvent, TimeoutNotifier, TimeoutQueue, TimeoutReceiver};
pub use session::Session;
pub use table::SessionTable;
