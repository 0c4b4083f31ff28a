//! Error taxonomy for the fortress.
//!
//! Every recoverable failure mode has its own variant so callers can
//! branch on kind rather than parse messages. I/O and JSON errors wrap
//! the underlying error; the security variants carry only event names
//! and paths, never key bytes or file contents.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = FortressError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FortressError {
    /// A dangerous capability grant is allowed without a matching deny.
    #[error("security violation: {0}")]
    Security(String),

    /// Checksum or authenticated-decryption mismatch. Never auto-resolved
    /// by overwriting; requires an explicit accept-baseline call.
    #[error("integrity failure: {0}")]
    Integrity(String),

    /// A symlink's resolved target escapes all allowed roots.
    #[error("symlink target escapes allowed roots: {}", .0.display())]
    SymlinkAttack(PathBuf),

    /// Could not serialize a repair within the time budget.
    #[error("could not acquire repair lock within {0:?}")]
    LockTimeout(Duration),

    /// A settings document has an unexpected shape (e.g. a bare string
    /// where a permission list belongs).
    #[error("settings schema violation: {0}")]
    Schema(String),

    /// Key material could not be derived, read, or rotated.
    #[error("crypto failure: {0}")]
    Crypto(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("serialization failure: {0}")]
    Json(#[from] serde_json::Error),
}

impl FortressError {
    /// True for failures that `fortress check` must surface as tamper
    /// (CLI exit code 2) rather than plain unhealthy.
    pub fn is_tamper(&self) -> bool {
        matches!(self, FortressError::Integrity(_))
    }
}
