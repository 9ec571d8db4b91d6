use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The current credential, owned exclusively by
/// [`CredentialState`](crate::credential::CredentialState).
///
/// Invariant: `signed_in == true` iff `token` and `expires_at` are both
/// present and `expires_at` was in the future at last observation. The absent
/// state (`token` and `expires_at` both `None`, `signed_in == false`) covers
/// "no token yet", sign-out, revocation, and a failed silent refresh alike.
///
/// # Security
///
/// The `Debug` implementation redacts the token.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credential {
    /// The opaque access token, if signed in
    pub token: Option<String>,
    /// When the token expires (UTC), if signed in
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a signed-in user currently backs this credential
    pub signed_in: bool,
}

impl Credential {
    /// The absent credential.
    pub fn absent() -> Self {
        Self::default()
    }

    /// Whether the credential is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (self.signed_in, &self.token, &self.expires_at) {
            (true, Some(_), Some(expires_at)) => *expires_at > now,
            _ => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .field("signed_in", &self.signed_in)
            .finish()
    }
}

/// Session state machine for the controller.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> Authenticating -> SignedIn
///                                  ^  |
///                                  |  v
///                              Refreshing
/// ```
///
/// `sign_out` is allowed from any state and always lands in `SignedOut`; a
/// failed silent refresh also falls back to `SignedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionState {
    /// No signed-in user
    #[default]
    SignedOut,
    /// Interactive or silent sign-in in progress
    Authenticating,
    /// A valid credential is held
    SignedIn,
    /// Proactive silent renewal in progress
    Refreshing,
}

impl SessionState {
    /// Whether a credential currently backs the session.
    ///
    /// Returns `true` for `SignedIn` and `Refreshing` (the old credential
    /// stays usable while the renewal runs).
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn | SessionState::Refreshing)
    }

    /// Whether a token operation is currently in flight.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionState::Authenticating | SessionState::Refreshing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::SignedOut => write!(f, "Signed Out"),
            SessionState::Authenticating => write!(f, "Authenticating..."),
            SessionState::SignedIn => write!(f, "Signed In"),
            SessionState::Refreshing => write!(f, "Refreshing Token..."),
        }
    }
}
