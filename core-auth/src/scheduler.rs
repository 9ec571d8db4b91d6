//! Proactive refresh countdown.
//!
//! Holds at most one armed timer whose fire time is `expires_at - lead_time`.
//! Re-arming cancels and replaces the existing countdown; a generation tag
//! keeps a replaced timer from clearing its successor's handle. An already
//! overdue expiry still fires through the spawned task rather than inline, so
//! a refresh can never grow the caller's stack.

use bridge_traits::Clock;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Callback invoked exactly once when the countdown fires.
pub type RefreshHook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct SchedulerInner {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

pub struct RefreshScheduler {
    lead_time: Duration,
    clock: Arc<dyn Clock>,
    inner: Arc<Mutex<SchedulerInner>>,
}

impl RefreshScheduler {
    pub fn new(lead_time: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            lead_time,
            clock,
            inner: Arc::new(Mutex::new(SchedulerInner::default())),
        }
    }

    /// Whether a countdown is currently armed.
    pub fn is_armed(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .handle
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Arm the countdown for `expires_at - lead_time`, replacing any
    /// existing one.
    ///
    /// If that point is already past, `on_fire` runs as soon as the scheduled
    /// task is polled. The hook fires exactly once; re-arming happens only
    /// through a fresh successful grant.
    pub fn arm(&self, expires_at: DateTime<Utc>, on_fire: RefreshHook) {
        let lead = chrono::Duration::from_std(self.lead_time).unwrap_or(chrono::Duration::zero());
        let delay = (expires_at - self.clock.now() - lead)
            .to_std()
            .unwrap_or(Duration::ZERO);

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.generation += 1;
        let generation = inner.generation;
        if let Some(old) = inner.handle.take() {
            old.abort();
        }

        debug!(delay_secs = delay.as_secs(), "refresh countdown armed");
        let slot = Arc::clone(&self.inner);
        inner.handle = Some(tokio::spawn(async move {
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            on_fire();
            let mut inner = slot.lock().unwrap_or_else(|e| e.into_inner());
            if inner.generation == generation {
                inner.handle = None;
            }
        }));
    }

    /// Cancel any pending countdown. Idempotent.
    pub fn disarm(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.generation += 1;
        if let Some(handle) = inner.handle.take() {
            handle.abort();
            debug!("refresh countdown disarmed");
        }
    }
}
