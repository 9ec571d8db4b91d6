//! # Host Bridge Traits
//!
//! Contracts between the NoteVault core and the host page's SDKs.
//!
//! ## Overview
//!
//! The core never talks to the identity provider or the storage API directly.
//! Both ship as externally loaded SDKs that the host environment exposes, and
//! this crate defines the narrow surface the core consumes from them:
//!
//! - [`SdkHost`](sdk::SdkHost) - asynchronous script-load completion signal
//!   for each external SDK
//! - [`IdentitySdk`](identity::IdentitySdk) / [`IdentityClient`](identity::IdentityClient) -
//!   client initialization, the fire-and-callback token request primitive,
//!   and best-effort revocation
//! - [`CredentialSink`](storage::CredentialSink) - the storage client's
//!   synchronous "set current credential" setter
//! - [`Clock`](time::Clock) - injectable time source for deterministic tests
//! - [`LoggerSink`](time::LoggerSink) - forward structured logs to the host
//!
//! ## Error Handling
//!
//! All bridge traits report failures through [`BridgeError`](error::BridgeError).
//! Host adapters should convert SDK-specific failures into the closest variant
//! and keep messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`: callbacks originating in the SDK
//! may arrive on a different task than the one that issued the request.

pub mod error;
pub mod identity;
pub mod sdk;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use identity::{
    GrantFailure, IdentityClient, IdentityConfig, IdentitySdk, RequestMode, RevokeCallback,
    TokenCallback, TokenGrant, TokenRequestOptions,
};
pub use sdk::{SdkHost, SdkId};
pub use storage::CredentialSink;
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
