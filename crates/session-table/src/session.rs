//! A single live session.

use aaa_core::AaaContext;
use parking_lot::{Mutex, MutexGuard};

/// One client's accounting context.
///
/// The RADIUS session id is fixed at construction; all other fields live
/// behind the session's own lock.
#[derive(Debug)]
pub struct Session {
    session_id: String,
    ctx: Mutex<AaaContext>,
}

impl Session {
    pub(crate) fn new(ctx: AaaContext) -> Self {
        Self {
            session_id: ctx.session_id.clone(),
            ctx: Mutex::new(ctx),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Locks the session's context for reading or mutation.
    pub fn lock(&self) -> MutexGuard<'_, AaaContext> {
        self.ctx.lock()
    }

    /// Copy of the context taken under the lock.
    pub fn snapshot(&self) -> AaaContext {
        self.ctx.lock().clone()
    }
}
