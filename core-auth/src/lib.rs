//! # NoteVault Authentication Core
//!
//! Access-token acquisition and lifecycle management for the NoteVault
//! storage backend.
//!
//! The crate is organized around one public entry point, the
//! [`SessionController`], which owns four internal pieces:
//!
//! - [`ScriptLoader`] - init-once loading of the external SDK scripts
//! - [`TokenRequestGate`] - single-flight wrapper over the identity SDK's
//!   callback-style token request, with a per-request deadline
//! - [`CredentialState`] - the one source of truth for the current token,
//!   propagated to the storage client and surfaced through the signed-in
//!   listener
//! - [`RefreshScheduler`] - the proactive countdown that triggers a silent
//!   renewal ahead of token expiry
//!
//! ## Session lifecycle
//!
//! ```text
//! SignedOut --sign_in--> Authenticating --grant--> SignedIn
//!     ^                        |                      |
//!     |<----- failure ---------+        scheduler --> Refreshing
//!     |                                                |
//!     +<------------- refresh failure -----------------+
//! ```
//!
//! A failed silent refresh signs the session out rather than retrying; the
//! host observes the transition through the signed-in listener and prompts
//! the user to sign in again.
//!
//! ## Example
//!
//! ```ignore
//! use core_auth::SessionController;
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .client_id("my-client-id.apps.example.com")
//!     .scope("https://storage.example.com/auth/appdata")
//!     .sdk_host(host)
//!     .identity_sdk(identity)
//!     .credential_sink(storage)
//!     .build()?;
//!
//! let session = SessionController::new(config);
//! session.on_signed_in_change(Box::new(|signed_in| {
//!     println!("signed in: {signed_in}");
//! }));
//! session.sign_in().await?;
//! let token = session.current_token();
//! ```

pub mod credential;
pub mod error;
pub mod gate;
pub mod loader;
pub mod scheduler;
pub mod session;
pub mod types;

pub use credential::{CredentialState, SessionListener};
pub use error::{AuthError, Result};
pub use gate::TokenRequestGate;
pub use loader::ScriptLoader;
pub use scheduler::{RefreshHook, RefreshScheduler};
pub use session::SessionController;
pub use types::{Credential, SessionState};
