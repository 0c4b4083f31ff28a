//! Fortress - integrity protection for Claude Code permission settings
//!
//! This crate provides the core functionality for the fortress, including:
//! - Symlink health verification and atomic, lock-coordinated repair
//! - Encrypted tamper-evident integrity snapshots
//! - HMAC-chained append-only audit logging
//! - Permission allow/deny validation against a fixed security policy

pub mod cli;
pub mod concurrency;
pub mod error;
pub mod paths;
pub mod security;

pub use error::{FortressError, Result};
pub use paths::FortressPaths;
pub use security::Fortress;
