//! External SDK identifiers and the host script-load signal.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two external SDKs the core depends on.
///
/// Each one is shipped by its vendor as a script the host environment loads;
/// the core only observes load completion through [`SdkHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SdkId {
    /// The identity provider's sign-in / token SDK
    Identity,
    /// The storage API's client SDK
    StorageClient,
}

impl SdkId {
    /// Identifier string used in logs and host lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkId::Identity => "identity",
            SdkId::StorageClient => "storage_client",
        }
    }
}

impl fmt::Display for SdkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host-side script loading.
///
/// `load_sdk` initiates (or joins) the host's load of the given SDK script and
/// resolves once the SDK's global entry point is usable. Implementations do
/// not need to deduplicate calls; the core's `ScriptLoader` guarantees at most
/// one in-flight `load_sdk` per [`SdkId`].
///
/// # Example
///
/// ```ignore
/// use bridge_traits::sdk::{SdkHost, SdkId};
///
/// async fn warm_up(host: &dyn SdkHost) -> bridge_traits::error::Result<()> {
///     host.load_sdk(SdkId::Identity).await?;
///     host.load_sdk(SdkId::StorageClient).await
/// }
/// ```
#[async_trait]
pub trait SdkHost: Send + Sync {
    /// Load the SDK script, resolving when its global marker is present.
    async fn load_sdk(&self, sdk: SdkId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_id_as_str() {
        assert_eq!(SdkId::Identity.as_str(), "identity");
        assert_eq!(SdkId::StorageClient.as_str(), "storage_client");
    }

    #[test]
    fn test_sdk_id_display() {
        assert_eq!(format!("{}", SdkId::Identity), "identity");
    }

    #[test]
    fn test_sdk_id_serialization() {
        let json = serde_json::to_string(&SdkId::StorageClient).unwrap();
        let back: SdkId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SdkId::StorageClient);
    }
}
