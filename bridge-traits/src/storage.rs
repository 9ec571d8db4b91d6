//! Storage client SDK contract.
//!
//! The storage-API client keeps its own notion of "the current credential";
//! every time the core's credential state changes it pushes the new token (or
//! its absence) through this setter. File operations themselves are outside
//! the core and simply consume whatever credential was last set.

/// The storage client's synchronous credential setter.
///
/// Called with `Some(token)` after every successful grant and `None` on
/// sign-out, revocation, or a failed silent refresh. Implementations must not
/// block; the core invokes this inside its state-transition path.
pub trait CredentialSink: Send + Sync {
    /// Replace the credential the storage client attaches to API calls.
    fn set_credential(&self, token: Option<&str>);
}
