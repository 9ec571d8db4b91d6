//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the NoteVault core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the auth core depends on. It
//! establishes the logging conventions and the fail-fast configuration
//! pattern used to hand host SDK adapters to the core.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{AuthSettings, CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
