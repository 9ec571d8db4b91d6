use bridge_traits::{GrantFailure, SdkId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// An external SDK script failed to load. Retryable: a later attempt
    /// issues a fresh load.
    #[error("SDK '{sdk}' failed to load: {reason}")]
    LoadFailed { sdk: SdkId, reason: String },

    /// A token request was issued while another is still pending. Caller bug;
    /// never retried internally.
    #[error("a token request is already in progress")]
    ConcurrentRequest,

    /// No callback arrived within the request deadline.
    #[error("token request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The provider requires fresh user consent; the silent path cannot
    /// proceed.
    #[error("identity provider requires user consent")]
    ConsentRequired,

    /// The identity SDK reported a grant failure.
    #[error("token grant failed: {0}")]
    Grant(String),

    /// A sign-in or refresh is already running.
    #[error("sign-in already in progress")]
    AlreadyInProgress,

    /// The pending token request was abandoned by a sign-out before the
    /// provider answered. Never triggers the interactive fallback.
    #[error("token request aborted by sign-out")]
    Aborted,

    /// Token revocation failed. Best-effort only: logged by the sign-out
    /// path, never propagated to callers.
    #[error("token revocation failed: {0}")]
    Revoke(String),
}

impl From<GrantFailure> for AuthError {
    fn from(failure: GrantFailure) -> Self {
        match failure {
            GrantFailure::ConsentRequired => AuthError::ConsentRequired,
            GrantFailure::AccessDenied => AuthError::Grant("access denied by user".to_string()),
            GrantFailure::Other(reason) => AuthError::Grant(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_failure_conversion() {
        assert!(matches!(
            AuthError::from(GrantFailure::ConsentRequired),
            AuthError::ConsentRequired
        ));
        assert!(matches!(
            AuthError::from(GrantFailure::AccessDenied),
            AuthError::Grant(_)
        ));
        assert!(matches!(
            AuthError::from(GrantFailure::Other("popup blocked".to_string())),
            AuthError::Grant(reason) if reason == "popup blocked"
        ));
    }

    #[test]
    fn test_display_messages() {
        let err = AuthError::LoadFailed {
            sdk: SdkId::Identity,
            reason: "network".to_string(),
        };
        assert_eq!(err.to_string(), "SDK 'identity' failed to load: network");

        let err = AuthError::Timeout { timeout_secs: 15 };
        assert_eq!(err.to_string(), "token request timed out after 15s");
    }
}
