//! Foundation types for nlterm.
//!
//! Shared by every nlterm crate: the error type and its user-facing kinds,
//! and the TOML-backed runtime configuration.

pub mod config;
pub mod error;
