//! Identity provider SDK contract.
//!
//! The identity SDK issues short-lived access tokens through an
//! inversion-of-control primitive: the caller fires a request and the SDK
//! eventually invokes a callback with either a grant or a failure. No refresh
//! tokens exist in this flow; renewal is always a fresh silent request.
//!
//! The core wraps [`IdentityClient::request_token`] in its own single-flight
//! gate, so implementations may assume at most one outstanding request.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a token request may interact with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestMode {
    /// No user-visible prompt; fails fast if the provider requires consent.
    Silent,
    /// May show a consent prompt.
    Interactive,
}

impl fmt::Display for RequestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMode::Silent => write!(f, "silent"),
            RequestMode::Interactive => write!(f, "interactive"),
        }
    }
}

/// Options for a single token request.
#[derive(Debug, Clone)]
pub struct TokenRequestOptions {
    pub mode: RequestMode,
}

impl TokenRequestOptions {
    pub fn silent() -> Self {
        Self {
            mode: RequestMode::Silent,
        }
    }

    pub fn interactive() -> Self {
        Self {
            mode: RequestMode::Interactive,
        }
    }
}

/// A successful token grant from the identity provider.
///
/// `expires_in` is the provider-reported lifetime in seconds; providers that
/// omit it get a default applied by the credential layer.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    /// The opaque access token used for API requests
    pub access_token: String,
    /// Seconds until expiry, if the provider reported one
    pub expires_in: Option<i64>,
}

impl TokenGrant {
    pub fn new(access_token: impl Into<String>, expires_in: Option<i64>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_in,
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Failure shapes the identity SDK can deliver to a token callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantFailure {
    /// The provider requires fresh user consent; a silent request cannot
    /// proceed.
    ConsentRequired,
    /// The user dismissed or denied the consent prompt.
    AccessDenied,
    /// Any other provider-reported error.
    Other(String),
}

impl fmt::Display for GrantFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantFailure::ConsentRequired => write!(f, "consent required"),
            GrantFailure::AccessDenied => write!(f, "access denied by user"),
            GrantFailure::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// Callback invoked exactly once with the outcome of a token request.
pub type TokenCallback = Box<dyn FnOnce(std::result::Result<TokenGrant, GrantFailure>) + Send>;

/// Callback invoked once with the outcome of a revocation attempt.
pub type RevokeCallback = Box<dyn FnOnce(Result<()>) + Send>;

/// Configuration handed to the identity SDK when initializing a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// OAuth client ID registered with the provider
    pub client_id: String,
    /// Scopes requested for every grant
    pub scopes: Vec<String>,
}

/// An initialized identity client.
///
/// Both primitives are fire-and-forget: the result arrives asynchronously on
/// the supplied callback, which the SDK must invoke at most once. There is no
/// cancellation primitive; an abandoned request's callback may still fire
/// later and callers must tolerate that.
pub trait IdentityClient: Send + Sync {
    /// Issue a token request; the outcome is delivered to `callback`.
    fn request_token(&self, options: TokenRequestOptions, callback: TokenCallback);

    /// Best-effort revocation of a previously issued access token.
    fn revoke(&self, token: &str, callback: RevokeCallback);
}

/// The loaded identity SDK namespace.
pub trait IdentitySdk: Send + Sync {
    /// Initialize a client bound to the given configuration.
    fn init_client(&self, config: &IdentityConfig) -> Result<Arc<dyn IdentityClient>>;
}
