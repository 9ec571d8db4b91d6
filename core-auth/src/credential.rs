//! Single source of truth for the current credential.
//!
//! Every transition through [`CredentialState::set`] / [`CredentialState::clear`]
//! synchronously pushes the new token (or its absence) to the storage client's
//! credential setter and notifies the session listener when the signed-in flag
//! actually changes value. No other component mutates the credential.

use crate::types::Credential;
use bridge_traits::{Clock, CredentialSink, TokenGrant};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Callback invoked with the new `signed_in` value on every transition.
///
/// The core holds at most one listener; registering a new one replaces the
/// previous (last-registered wins). Invocation is synchronous at the point of
/// transition.
pub type SessionListener = Box<dyn Fn(bool) + Send + Sync>;

pub struct CredentialState {
    credential: Mutex<Credential>,
    listener: Mutex<Option<SessionListener>>,
    sink: Arc<dyn CredentialSink>,
    clock: Arc<dyn Clock>,
    default_expires_in: i64,
}

impl CredentialState {
    pub fn new(sink: Arc<dyn CredentialSink>, clock: Arc<dyn Clock>, default_expires_in: i64) -> Self {
        Self {
            credential: Mutex::new(Credential::absent()),
            listener: Mutex::new(None),
            sink,
            clock,
            default_expires_in,
        }
    }

    /// Snapshot of the current credential.
    pub fn get(&self) -> Credential {
        self.credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Whether the stored credential is signed in and unexpired.
    pub fn is_valid(&self) -> bool {
        self.credential
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_valid_at(self.clock.now())
    }

    /// The current access token, if signed in.
    pub fn current_token(&self) -> Option<String> {
        let credential = self.credential.lock().unwrap_or_else(|e| e.into_inner());
        if credential.signed_in {
            credential.token.clone()
        } else {
            None
        }
    }

    /// Install the new credential from a grant and return its expiry.
    ///
    /// Uses the configured default lifetime when the provider omitted
    /// `expires_in`. Propagates the token to the storage client and notifies
    /// the listener if this flipped `signed_in` to `true`.
    pub fn set(&self, grant: &TokenGrant) -> DateTime<Utc> {
        let expires_in = grant.expires_in.unwrap_or(self.default_expires_in);
        let expires_at = self.clock.now() + chrono::Duration::seconds(expires_in);

        let was_signed_in = {
            let mut credential = self.credential.lock().unwrap_or_else(|e| e.into_inner());
            let was = credential.signed_in;
            *credential = Credential {
                token: Some(grant.access_token.clone()),
                expires_at: Some(expires_at),
                signed_in: true,
            };
            was
        };

        debug!(expires_in, "credential installed");
        self.sink.set_credential(Some(&grant.access_token));
        if !was_signed_in {
            self.notify(true);
        }
        expires_at
    }

    /// Reset to the absent state.
    ///
    /// Propagates the cleared credential to the storage client and notifies
    /// the listener if this flipped `signed_in` to `false`.
    pub fn clear(&self) {
        let was_signed_in = {
            let mut credential = self.credential.lock().unwrap_or_else(|e| e.into_inner());
            let was = credential.signed_in;
            *credential = Credential::absent();
            was
        };

        self.sink.set_credential(None);
        if was_signed_in {
            debug!("credential cleared");
            self.notify(false);
        }
    }

    /// Register the signed-in-change listener. Last-registered wins.
    pub fn set_listener(&self, listener: SessionListener) {
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }

    fn notify(&self, signed_in: bool) {
        let listener = self.listener.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(listener) = listener.as_ref() {
            listener(signed_in);
        }
    }
}
