//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `notevault-workspace` and
//! enable the documented features without needing to wire each crate
//! individually. The interesting code lives in `core-auth` (session and token
//! lifecycle), `core-runtime` (logging and configuration), and `bridge-traits`
//! (host SDK contracts).
