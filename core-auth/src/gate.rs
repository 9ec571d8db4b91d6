//! Single-flight gate over the identity SDK's token request primitive.
//!
//! The SDK delivers grants through a fire-and-callback API with no
//! cancellation. The gate wraps that into a single pending awaitable: one
//! slot, resolved exactly once by the SDK callback, with a deadline fallback.
//! Every pending request carries a generation tag; deliveries for a cleared
//! or superseded generation are ignored, so a callback arriving after a
//! timeout or after sign-out can never double-resolve or resurrect state.

use crate::error::{AuthError, Result};
use bridge_traits::{GrantFailure, IdentityClient, TokenGrant, TokenRequestOptions};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

type Delivery = std::result::Result<TokenGrant, GrantFailure>;

struct Pending {
    generation: u64,
    deliver: oneshot::Sender<Delivery>,
}

#[derive(Default)]
struct GateInner {
    pending: Option<Pending>,
    next_generation: u64,
}

/// Enforces at most one in-flight token request at a time.
pub struct TokenRequestGate {
    inner: Arc<Mutex<GateInner>>,
    timeout: Duration,
}

impl TokenRequestGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(GateInner::default())),
            timeout,
        }
    }

    /// Whether a request is currently pending.
    pub fn is_pending(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pending
            .is_some()
    }

    /// Issue a token request and await its outcome.
    ///
    /// The SDK callback is the only path that resolves the request; if no
    /// callback arrives within the deadline the request fails with
    /// [`AuthError::Timeout`] and the slot is cleared. Each call gets its own
    /// fresh deadline.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ConcurrentRequest`] if a request is already pending
    /// - [`AuthError::Timeout`] if the deadline elapses first
    /// - [`AuthError::Aborted`] if [`abandon`](Self::abandon) cleared the
    ///   slot first
    /// - [`AuthError::ConsentRequired`] / [`AuthError::Grant`] for
    ///   SDK-reported failures
    #[instrument(skip(self, client), fields(mode = %options.mode))]
    pub async fn request(
        &self,
        client: &dyn IdentityClient,
        options: TokenRequestOptions,
    ) -> Result<TokenGrant> {
        let (generation, rx) = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            if inner.pending.is_some() {
                return Err(AuthError::ConcurrentRequest);
            }
            let generation = inner.next_generation;
            inner.next_generation += 1;
            let (tx, rx) = oneshot::channel();
            inner.pending = Some(Pending {
                generation,
                deliver: tx,
            });
            (generation, rx)
        };

        debug!(generation, "issuing token request");
        let slot = Arc::clone(&self.inner);
        client.request_token(
            options,
            Box::new(move |delivery| Self::deliver(&slot, generation, delivery)),
        );

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(delivery)) => delivery.map_err(AuthError::from),
            // Slot was abandoned (sign-out) before the SDK answered.
            Ok(Err(_)) => Err(AuthError::Aborted),
            Err(_) => {
                let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                if inner
                    .pending
                    .as_ref()
                    .is_some_and(|p| p.generation == generation)
                {
                    inner.pending = None;
                }
                Err(AuthError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        }
    }

    /// Abandon the pending request, if any.
    ///
    /// The awaiting caller observes [`AuthError::Aborted`]; the SDK's eventual
    /// late callback is ignored. Idempotent.
    pub fn abandon(&self) {
        let dropped = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.pending.take()
        };
        if let Some(pending) = dropped {
            debug!(generation = pending.generation, "abandoning pending token request");
        }
    }

    fn deliver(slot: &Arc<Mutex<GateInner>>, generation: u64, delivery: Delivery) {
        let pending = {
            let mut inner = slot.lock().unwrap_or_else(|e| e.into_inner());
            match &inner.pending {
                Some(p) if p.generation == generation => inner.pending.take(),
                _ => None,
            }
        };
        match pending {
            Some(p) => {
                let _ = p.deliver.send(delivery);
            }
            // Timed out, abandoned, or superseded; drop the delivery.
            None => debug!(generation, "ignoring late token delivery"),
        }
    }
}
