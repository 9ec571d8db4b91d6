//! Session controller: the public surface of the auth core.
//!
//! Composes the script loader, token request gate, credential state, and
//! refresh scheduler into one state machine
//! (`SignedOut -> Authenticating -> SignedIn <-> Refreshing`) and drives the
//! interactive-fallback policy:
//!
//! - `sign_in` tries a silent grant first and falls back to an interactive
//!   one; failure of both clears the credential and surfaces the error.
//! - A scheduler-triggered silent refresh that fails signs the session out
//!   without retrying; the listener transition to `false` is the signal that
//!   re-authentication is needed.
//! - `sign_out` is allowed from any state: it disarms the scheduler, abandons
//!   any pending request, best-effort revokes the token, and clears state.

use crate::credential::{CredentialState, SessionListener};
use crate::error::{AuthError, Result};
use crate::gate::TokenRequestGate;
use crate::loader::ScriptLoader;
use crate::scheduler::RefreshScheduler;
use crate::types::{Credential, SessionState};
use bridge_traits::{
    IdentityClient, IdentityConfig, IdentitySdk, SdkId, TokenGrant, TokenRequestOptions,
};
use chrono::{DateTime, Utc};
use core_runtime::config::CoreConfig;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, instrument, warn};

pub struct SessionController {
    loader: ScriptLoader,
    gate: TokenRequestGate,
    credentials: CredentialState,
    scheduler: RefreshScheduler,
    identity_sdk: Arc<dyn IdentitySdk>,
    identity_config: IdentityConfig,
    client: Mutex<Option<Arc<dyn IdentityClient>>>,
    state: Mutex<SessionState>,
    // Handed to the refresh scheduler's hook so a fired countdown can reach
    // back into the controller without keeping it alive.
    weak_self: Weak<SessionController>,
}

impl SessionController {
    /// Build the controller from a validated [`CoreConfig`].
    pub fn new(config: CoreConfig) -> Arc<Self> {
        let settings = &config.settings;
        Arc::new_cyclic(|weak_self| Self {
            loader: ScriptLoader::new(config.sdk_host),
            gate: TokenRequestGate::new(settings.request_timeout()),
            credentials: CredentialState::new(
                config.credential_sink,
                Arc::clone(&config.clock),
                settings.default_expires_in_secs,
            ),
            scheduler: RefreshScheduler::new(settings.refresh_lead(), config.clock),
            identity_sdk: config.identity_sdk,
            identity_config: IdentityConfig {
                client_id: settings.client_id.clone(),
                scopes: settings.scopes.clone(),
            },
            client: Mutex::new(None),
            state: Mutex::new(SessionState::SignedOut),
            weak_self: weak_self.clone(),
        })
    }

    /// Sign in, suspending until both SDKs are loaded and a grant (silent,
    /// then interactive) completes.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AlreadyInProgress`] when a sign-in or refresh is running
    /// - [`AuthError::LoadFailed`] when an SDK script fails to load (the
    ///   previous session state is preserved; retryable)
    /// - [`AuthError::Aborted`] when `sign_out` interrupted this sign-in; the
    ///   session stays signed out and no interactive prompt is shown
    /// - the interactive request's error when both grant attempts fail (the
    ///   credential is cleared and the session lands in `SignedOut`)
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<()> {
        let previous = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.is_in_progress() {
                return Err(AuthError::AlreadyInProgress);
            }
            let previous = *state;
            *state = SessionState::Authenticating;
            previous
        };

        if let Err(err) = self.load_sdks().await {
            // No grant was attempted; keep whatever session existed before.
            self.revert_from_authenticating(previous);
            return Err(err);
        }

        let client = match self.ensure_client() {
            Ok(client) => client,
            Err(err) => {
                self.revert_from_authenticating(previous);
                return Err(err);
            }
        };

        let outcome = match self
            .gate
            .request(client.as_ref(), TokenRequestOptions::silent())
            .await
        {
            Ok(grant) => Ok(grant),
            // Abandoned by sign_out: the user asked to leave, so no
            // interactive prompt may follow.
            Err(AuthError::Aborted) => Err(AuthError::Aborted),
            Err(silent_err) => {
                info!(error = %silent_err, "silent sign-in failed, falling back to interactive");
                self.gate
                    .request(client.as_ref(), TokenRequestOptions::interactive())
                    .await
            }
        };

        match outcome {
            Ok(grant) => {
                if !self.install_grant(&grant, SessionState::Authenticating) {
                    info!("sign-in overtaken by sign-out, dropping grant");
                    return Err(AuthError::Aborted);
                }
                info!("sign-in completed");
                Ok(())
            }
            // sign_out already cleared the credential and set the state.
            Err(AuthError::Aborted) => {
                info!("sign-in aborted by sign-out");
                Err(AuthError::Aborted)
            }
            Err(err) => {
                warn!(error = %err, "sign-in failed");
                self.credentials.clear();
                self.set_state(SessionState::SignedOut);
                Err(err)
            }
        }
    }

    /// Sign out from any state.
    ///
    /// Revocation is best-effort: its failure is logged and swallowed. A
    /// pending token request is abandoned; its late callback is ignored.
    #[instrument(skip(self))]
    pub fn sign_out(&self) {
        info!("signing out");
        self.scheduler.disarm();
        self.gate.abandon();

        if let Some(token) = self.credentials.get().token {
            if let Some(client) = self.client() {
                client.revoke(
                    &token,
                    Box::new(|result| {
                        if let Err(e) = result {
                            let err = AuthError::Revoke(e.to_string());
                            warn!(error = %err, "ignoring revocation failure");
                        }
                    }),
                );
            }
        }

        self.credentials.clear();
        self.set_state(SessionState::SignedOut);
    }

    /// Whether a signed-in, unexpired credential currently backs the session.
    ///
    /// True in `SignedIn` and in `Refreshing` (the old credential stays
    /// usable while the renewal runs).
    pub fn is_authenticated(&self) -> bool {
        self.current_state().is_authenticated() && self.credentials.is_valid()
    }

    /// The current access token, if signed in.
    pub fn current_token(&self) -> Option<String> {
        self.credentials.current_token()
    }

    /// Snapshot of the current credential.
    pub fn current_credential(&self) -> Credential {
        self.credentials.get()
    }

    /// The controller's current state.
    pub fn current_state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the signed-in-change listener. Last-registered wins; invoked
    /// synchronously with the new value on every actual transition.
    pub fn on_signed_in_change(&self, listener: SessionListener) {
        self.credentials.set_listener(listener);
    }

    async fn load_sdks(&self) -> Result<()> {
        self.loader.ensure_loaded(SdkId::Identity).await?;
        self.loader.ensure_loaded(SdkId::StorageClient).await?;
        Ok(())
    }

    fn ensure_client(&self) -> Result<Arc<dyn IdentityClient>> {
        let mut client = self.client.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(client) = client.as_ref() {
            return Ok(Arc::clone(client));
        }
        let initialized = self
            .identity_sdk
            .init_client(&self.identity_config)
            .map_err(|e| AuthError::Grant(format!("identity client init failed: {}", e)))?;
        *client = Some(Arc::clone(&initialized));
        Ok(initialized)
    }

    fn client(&self) -> Option<Arc<dyn IdentityClient>> {
        self.client
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// Undo `Authenticating`, unless a sign-out already moved the state on.
    fn revert_from_authenticating(&self, previous: SessionState) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == SessionState::Authenticating {
            *state = previous;
        }
    }

    /// Install the grant and move to `SignedIn`, unless a sign-out changed
    /// the state while the grant was in flight. Returns whether it installed.
    fn install_grant(&self, grant: &TokenGrant, from: SessionState) -> bool {
        {
            let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != from {
                return false;
            }
        }
        let expires_at = self.credentials.set(grant);
        self.arm_refresh(expires_at);
        self.set_state(SessionState::SignedIn);
        true
    }

    fn arm_refresh(&self, expires_at: DateTime<Utc>) {
        let weak = self.weak_self.clone();
        self.scheduler.arm(
            expires_at,
            Box::new(move || {
                if let Some(controller) = weak.upgrade() {
                    tokio::spawn(async move { controller.refresh().await });
                }
            }),
        );
    }

    /// Proactive silent renewal, triggered only by the scheduler.
    ///
    /// Failures never propagate (there is no caller): they manifest as a
    /// transition to `SignedOut` and a listener notification. No automatic
    /// retry; the next interactive `sign_in` recovers.
    #[instrument(skip(self))]
    async fn refresh(self: Arc<Self>) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if *state != SessionState::SignedIn {
                debug!(state = %state, "skipping refresh outside SignedIn");
                return;
            }
            *state = SessionState::Refreshing;
        }

        let Some(client) = self.client() else {
            warn!("refresh fired without an identity client, signing out");
            self.credentials.clear();
            self.set_state(SessionState::SignedOut);
            return;
        };

        match self
            .gate
            .request(client.as_ref(), TokenRequestOptions::silent())
            .await
        {
            Ok(grant) => {
                if self.install_grant(&grant, SessionState::Refreshing) {
                    info!("token refreshed");
                }
            }
            // sign_out already cleared the credential and set the state.
            Err(AuthError::Aborted) => {
                debug!("refresh abandoned by sign-out");
            }
            Err(err) => {
                warn!(error = %err, "silent refresh failed, signing out");
                self.credentials.clear();
                self.set_state(SessionState::SignedOut);
            }
        }
    }
}
