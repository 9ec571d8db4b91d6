//! # Core Configuration Module
//!
//! Provides configuration management for the NoteVault core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] instance holding the host SDK adapters and auth settings the
//! session controller needs. It enforces fail-fast validation so a missing
//! bridge surfaces at startup rather than mid-flow.
//!
//! ## Required Dependencies
//!
//! - `SdkHost` - script-load completion signal for the external SDKs
//! - `IdentitySdk` - identity provider SDK entry point
//! - `CredentialSink` - the storage client's credential setter
//!
//! ## Optional Dependencies
//!
//! - `Clock` - time source (defaults to [`SystemClock`])
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .client_id("my-client-id.apps.example.com")
//!     .scope("https://storage.example.com/auth/appdata")
//!     .sdk_host(Arc::new(MySdkHost))
//!     .identity_sdk(Arc::new(MyIdentitySdk))
//!     .credential_sink(Arc::new(MyStorageClient))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, CredentialSink, IdentitySdk, SdkHost, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for a single token request (15 seconds).
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default lead time before expiry at which a silent refresh fires (5 minutes).
const DEFAULT_REFRESH_LEAD_SECS: u64 = 300;

/// Default token lifetime applied when the provider omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Tunable authentication settings.
///
/// All durations are stored in seconds so the settings stay serializable;
/// accessor methods expose them as [`Duration`] where the core consumes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// OAuth client ID registered with the identity provider
    pub client_id: String,

    /// Scopes requested for every grant
    pub scopes: Vec<String>,

    /// Deadline for a single token request, in seconds
    pub request_timeout_secs: u64,

    /// Lead time before expiry at which a silent refresh is triggered, in seconds
    pub refresh_lead_secs: u64,

    /// Lifetime assumed when the provider omits `expires_in`, in seconds
    pub default_expires_in_secs: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            scopes: Vec::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            refresh_lead_secs: DEFAULT_REFRESH_LEAD_SECS,
            default_expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
        }
    }
}

impl AuthSettings {
    /// Token request deadline as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Refresh lead time as a [`Duration`].
    pub fn refresh_lead(&self) -> Duration {
        Duration::from_secs(self.refresh_lead_secs)
    }
}

/// Core configuration for the NoteVault auth core.
///
/// Holds the host SDK adapters and settings required to construct the session
/// controller. Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Script-load signal for the external SDKs (required)
    pub sdk_host: Arc<dyn SdkHost>,

    /// Identity provider SDK entry point (required)
    pub identity_sdk: Arc<dyn IdentitySdk>,

    /// Storage client credential setter (required)
    pub credential_sink: Arc<dyn CredentialSink>,

    /// Time source
    pub clock: Arc<dyn Clock>,

    /// Authentication settings
    pub settings: AuthSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("sdk_host", &"SdkHost { ... }")
            .field("identity_sdk", &"IdentitySdk { ... }")
            .field("credential_sink", &"CredentialSink { ... }")
            .field("clock", &"Clock { ... }")
            .field("settings", &self.settings)
            .finish()
    }
}

impl CoreConfig {
    /// Create a new builder.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`] with fail-fast validation.
#[derive(Default)]
pub struct CoreConfigBuilder {
    sdk_host: Option<Arc<dyn SdkHost>>,
    identity_sdk: Option<Arc<dyn IdentitySdk>>,
    credential_sink: Option<Arc<dyn CredentialSink>>,
    clock: Option<Arc<dyn Clock>>,
    settings: AuthSettings,
}

impl CoreConfigBuilder {
    /// Set the script-load host adapter (required).
    pub fn sdk_host(mut self, host: Arc<dyn SdkHost>) -> Self {
        self.sdk_host = Some(host);
        self
    }

    /// Set the identity SDK adapter (required).
    pub fn identity_sdk(mut self, sdk: Arc<dyn IdentitySdk>) -> Self {
        self.identity_sdk = Some(sdk);
        self
    }

    /// Set the storage client credential setter (required).
    pub fn credential_sink(mut self, sink: Arc<dyn CredentialSink>) -> Self {
        self.credential_sink = Some(sink);
        self
    }

    /// Set a custom time source. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Set the OAuth client ID (required, non-empty).
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.settings.client_id = client_id.into();
        self
    }

    /// Append a scope to request with every grant.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.settings.scopes.push(scope.into());
        self
    }

    /// Override the per-request deadline. Sub-second precision rounds up to
    /// the next whole second.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.settings.request_timeout_secs = secs_ceil(timeout);
        self
    }

    /// Override the refresh lead time. Sub-second precision rounds up to the
    /// next whole second.
    pub fn refresh_lead(mut self, lead: Duration) -> Self {
        self.settings.refresh_lead_secs = secs_ceil(lead);
        self
    }

    /// Override the default token lifetime.
    pub fn default_expires_in_secs(mut self, secs: i64) -> Self {
        self.settings.default_expires_in_secs = secs;
        self
    }

    /// Replace the settings wholesale.
    pub fn settings(mut self, settings: AuthSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] when a required bridge was not
    /// provided and [`Error::Config`] for invalid settings.
    pub fn build(self) -> Result<CoreConfig> {
        let sdk_host = self.sdk_host.ok_or_else(|| Error::CapabilityMissing {
            capability: "SdkHost".to_string(),
            message: "No script-load adapter provided. \
                      Inject the host's SDK loader before building the config."
                .to_string(),
        })?;

        let identity_sdk = self.identity_sdk.ok_or_else(|| Error::CapabilityMissing {
            capability: "IdentitySdk".to_string(),
            message: "No identity SDK adapter provided. \
                      Inject the provider's sign-in SDK entry point."
                .to_string(),
        })?;

        let credential_sink = self
            .credential_sink
            .ok_or_else(|| Error::CapabilityMissing {
                capability: "CredentialSink".to_string(),
                message: "No storage client credential setter provided. \
                          Inject the storage SDK's set-credential adapter."
                    .to_string(),
            })?;

        if self.settings.client_id.is_empty() {
            return Err(Error::Config("client_id must not be empty".to_string()));
        }
        if self.settings.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.settings.default_expires_in_secs <= 0 {
            return Err(Error::Config(
                "default_expires_in_secs must be positive".to_string(),
            ));
        }

        Ok(CoreConfig {
            sdk_host,
            identity_sdk,
            credential_sink,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            settings: self.settings,
        })
    }
}

/// Whole-second ceiling, so a non-zero sub-second override never collapses
/// to zero and then fails validation.
fn secs_ceil(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{
        IdentityClient, IdentityConfig, RevokeCallback, SdkId, TokenCallback, TokenRequestOptions,
    };

    struct NoopSdkHost;

    #[async_trait::async_trait]
    impl SdkHost for NoopSdkHost {
        async fn load_sdk(&self, _sdk: SdkId) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NoopIdentityClient;

    impl IdentityClient for NoopIdentityClient {
        fn request_token(&self, _options: TokenRequestOptions, _callback: TokenCallback) {}
        fn revoke(&self, _token: &str, _callback: RevokeCallback) {}
    }

    struct NoopIdentitySdk;

    impl IdentitySdk for NoopIdentitySdk {
        fn init_client(&self, _config: &IdentityConfig) -> BridgeResult<Arc<dyn IdentityClient>> {
            Ok(Arc::new(NoopIdentityClient))
        }
    }

    struct NoopSink;

    impl CredentialSink for NoopSink {
        fn set_credential(&self, _token: Option<&str>) {}
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .client_id("client-id")
            .scope("appdata")
            .sdk_host(Arc::new(NoopSdkHost))
            .identity_sdk(Arc::new(NoopIdentitySdk))
            .credential_sink(Arc::new(NoopSink))
    }

    #[test]
    fn test_build_with_all_bridges() {
        let config = full_builder().build().unwrap();
        assert_eq!(config.settings.client_id, "client-id");
        assert_eq!(config.settings.scopes, vec!["appdata".to_string()]);
        assert_eq!(config.settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.settings.refresh_lead(), Duration::from_secs(300));
        assert_eq!(config.settings.default_expires_in_secs, 3600);
    }

    #[test]
    fn test_missing_sdk_host_fails() {
        let result = CoreConfig::builder()
            .client_id("client-id")
            .identity_sdk(Arc::new(NoopIdentitySdk))
            .credential_sink(Arc::new(NoopSink))
            .build();

        assert!(matches!(
            result.unwrap_err(),
            Error::CapabilityMissing { capability, .. } if capability == "SdkHost"
        ));
    }

    #[test]
    fn test_missing_identity_sdk_fails() {
        let result = CoreConfig::builder()
            .client_id("client-id")
            .sdk_host(Arc::new(NoopSdkHost))
            .credential_sink(Arc::new(NoopSink))
            .build();

        assert!(matches!(
            result.unwrap_err(),
            Error::CapabilityMissing { capability, .. } if capability == "IdentitySdk"
        ));
    }

    #[test]
    fn test_empty_client_id_fails() {
        let result = CoreConfig::builder()
            .sdk_host(Arc::new(NoopSdkHost))
            .identity_sdk(Arc::new(NoopIdentitySdk))
            .credential_sink(Arc::new(NoopSink))
            .build();

        assert!(matches!(result.unwrap_err(), Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = full_builder()
            .request_timeout(Duration::from_secs(30))
            .refresh_lead(Duration::from_secs(60))
            .default_expires_in_secs(1800)
            .build()
            .unwrap();

        assert_eq!(config.settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.settings.refresh_lead(), Duration::from_secs(60));
        assert_eq!(config.settings.default_expires_in_secs, 1800);
    }

    #[test]
    fn test_sub_second_durations_round_up() {
        let config = full_builder()
            .request_timeout(Duration::from_millis(500))
            .refresh_lead(Duration::from_millis(1500))
            .build()
            .unwrap();

        assert_eq!(config.settings.request_timeout_secs, 1);
        assert_eq!(config.settings.refresh_lead_secs, 2);
    }

    #[test]
    fn test_settings_serialization() {
        let settings = AuthSettings {
            client_id: "id".to_string(),
            scopes: vec!["a".to_string()],
            ..AuthSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: AuthSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.client_id, "id");
        assert_eq!(back.request_timeout_secs, 15);
    }
}
