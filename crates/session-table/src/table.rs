//! Concurrent session storage and idle timers.
//!
//! Structural operations (insert, remove, lookup) go through the table lock;
//! a session's fields go through the session's own lock. Lookups never take
//! a session lock.
//!
//! Removal decides who finalizes a session. An idle timer only notifies if
//! it is still the armed timer for its session when it takes the table lock,
//! so an explicit removal or a rearm always wins over a timer that is
//! already running.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aaa_core::{require_context, strip_imsi_prefix, AaaContext, Error, Result};
use parking_lot::RwLock;
use telemetry::metrics;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{Session, TimeoutNotifier};

/// Shared handle to the table of live sessions.
#[derive(Clone, Default)]
pub struct SessionTable {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: RwLock<TableState>,
    generations: AtomicU64,
}

#[derive(Default)]
struct TableState {
    by_id: HashMap<String, Entry>,
    /// bare IMSI -> session id
    by_imsi: HashMap<String, String>,
}

struct Entry {
    session: Arc<Session>,
    imsi_key: String,
    timer: Option<Timer>,
}

struct Timer {
    generation: u64,
    task: JoinHandle<()>,
}

impl Timer {
    fn cancel(self) {
        self.task.abort();
    }
}

impl TableState {
    fn take(&mut self, session_id: &str) -> Option<Entry> {
        let entry = self.by_id.remove(session_id)?;
        if self.by_imsi.get(&entry.imsi_key).map(String::as_str) == Some(session_id) {
            self.by_imsi.remove(&entry.imsi_key);
        }
        metrics().active_sessions.dec();
        Some(entry)
    }
}

impl Inner {
    /// Removes the session if `generation` is still its armed timer.
    fn expire(&self, session_id: &str, generation: u64) -> Option<Arc<Session>> {
        let mut state = self.state.write();
        let armed = state
            .by_id
            .get(session_id)
            .and_then(|entry| entry.timer.as_ref())
            .map(|timer| timer.generation);
        if armed != Some(generation) {
            return None;
        }
        state.take(session_id).map(|entry| entry.session)
    }
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a session by RADIUS session id.
    pub fn get_session(&self, session_id: &str) -> Option<Arc<Session>> {
        self.inner
            .state
            .read()
            .by_id
            .get(session_id)
            .map(|entry| entry.session.clone())
    }

    /// Looks up the live session of a subscriber, with or without the IMSI prefix.
    pub fn get_session_by_imsi(&self, imsi: &str) -> Option<Arc<Session>> {
        let state = self.inner.state.read();
        let session_id = state.by_imsi.get(strip_imsi_prefix(imsi))?;
        state.by_id.get(session_id).map(|entry| entry.session.clone())
    }

    /// Inserts a session built from `ctx` and arms its idle timer.
    ///
    /// Without `overwrite`, fails with ALREADY_EXISTS if the subscriber or
    /// the session id is already live. With `overwrite`, the prior entries
    /// are replaced and their timers cancelled without notification.
    pub fn add_session(
        &self,
        ctx: AaaContext,
        timeout: Duration,
        notifier: Arc<dyn TimeoutNotifier>,
        overwrite: bool,
    ) -> Result<Arc<Session>> {
        require_context(Some(&ctx), "session context")?;

        let session_id = ctx.session_id.clone();
        let imsi_key = strip_imsi_prefix(&ctx.imsi).to_string();

        let mut state = self.inner.state.write();
        let prior = state.by_imsi.get(&imsi_key).cloned();

        if !overwrite {
            if let Some(existing) = &prior {
                return Err(Error::already_exists(format!(
                    "IMSI {} already has session {}",
                    imsi_key, existing
                )));
            }
            if state.by_id.contains_key(&session_id) {
                return Err(Error::already_exists(format!(
                    "session {} already exists",
                    session_id
                )));
            }
        }

        for replaced in prior.into_iter().chain(std::iter::once(session_id.clone())) {
            if let Some(old) = state.take(&replaced) {
                if let Some(timer) = old.timer {
                    timer.cancel();
                }
                debug!(session_id = %replaced, imsi = %imsi_key, "Replaced existing session");
            }
        }

        let session = Arc::new(Session::new(ctx));
        let timer = self.arm(&session_id, timeout, notifier);
        state.by_imsi.insert(imsi_key.clone(), session_id.clone());
        state.by_id.insert(
            session_id,
            Entry {
                session: session.clone(),
                imsi_key,
                timer: Some(timer),
            },
        );
        metrics().active_sessions.inc();

        Ok(session)
    }

    /// Removes and returns a session, cancelling its idle timer.
    ///
    /// `None` means the session is already gone.
    pub fn remove_session(&self, session_id: &str) -> Option<Arc<Session>> {
        let entry = self.inner.state.write().take(session_id)?;
        if let Some(timer) = entry.timer {
            timer.cancel();
        }
        Some(entry.session)
    }

    /// Rearms the idle timer of a live session, replacing any pending one.
    ///
    /// Returns `false` if the session is not in the table.
    pub fn set_timeout(
        &self,
        session_id: &str,
        timeout: Duration,
        notifier: Arc<dyn TimeoutNotifier>,
    ) -> bool {
        let mut state = self.inner.state.write();
        let Some(entry) = state.by_id.get_mut(session_id) else {
            return false;
        };
        if let Some(previous) = entry.timer.take() {
            previous.cancel();
        }
        entry.timer = Some(self.arm(session_id, timeout, notifier));
        true
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn arm(
        &self,
        session_id: &str,
        timeout: Duration,
        notifier: Arc<dyn TimeoutNotifier>,
    ) -> Timer {
        let generation = self.inner.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let table = Arc::downgrade(&self.inner);
        let session_id = session_id.to_string();

        let task = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let Some(inner) = table.upgrade() else {
                return;
            };
            let Some(session) = inner.expire(&session_id, generation) else {
                return;
            };
            drop(inner);

            info!(session_id = %session_id, "Session idle timeout");
            notifier.notify(session.snapshot());
        });

        Timer { generation, task }
    }
}
