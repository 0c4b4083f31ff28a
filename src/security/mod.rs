//! # Fortress Security Module
//!
//! Central security module for the fortress. All security-critical
//! types, constants, and functions are re-exported here.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                fortress.rs — orchestrator                        │
//! │                check / fortress_check / rotate / reset           │
//! ├────────────┬───────────┬─────────────┬─────────────┬────────────┤
//! │ vault.rs   │ audit.rs  │ integrity.rs│ symlink.rs  │ validator  │
//! │ AEAD key   │ HMAC-     │ Encrypted   │ Verify +    │ Allow/deny │
//! │ derivation │ chained   │ checksum    │ atomic      │ policy     │
//! │ + encrypt  │ append-   │ snapshots   │ repair      │ checks +   │
//! │ / decrypt  │ only log  │             │ under lock  │ pure fix   │
//! ├────────────┴───────────┴─────────────┴─────────────┴────────────┤
//! │ backup.rs — encrypted pre-repair captures, never auto-deleted   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Model
//!
//! 1. **One canonical source**: `.claude/settings.local.json` is always
//!    a symlink to `~/.claude/settings.json` — or absent. A regular
//!    file, a dangling link, or a link escaping the allowed roots is
//!    unhealthy and gets repaired atomically under the repair lock.
//!
//! 2. **Tamper-evident**: protected file checksums are sealed in an
//!    AEAD-encrypted snapshot; the audit log chains every entry with an
//!    HMAC. Flipping one byte in either fails the matching verify and
//!    localizes to the offending file or entry.
//!
//! 3. **Drift is surfaced, never absorbed**: an integrity mismatch is
//!    logged CRITICAL and raised. Only the explicit accept-baseline
//!    call adopts unexplained on-disk state.
//!
//! 4. **Backups before destruction**: every rewrite of settings content
//!    is preceded by an encrypted [`BackupRecord`].
//!
//! ## File Hierarchy
//!
//! ```text
//! ~/.claude/settings.json            # canonical global settings
//! .claude/
//! ├── settings.local.json            # symlink to the above
//! └── security/
//!     ├── integrity.enc              # encrypted checksum snapshot
//!     ├── audit.log                  # HMAC-chained audit entries
//!     ├── vault.key                  # AEAD key (0600, unless env key)
//!     ├── audit.key                  # audit MAC secret (0600)
//!     ├── repair.lock                # advisory repair lock
//!     └── backups/backup_<ts>.enc    # encrypted pre-repair captures
//! ```

mod audit;
mod backup;
mod fortress;
mod integrity;
mod symlink;
mod validator;
mod vault;

// ── Orchestrator ────────────────────────────────────────────────────

pub use self::fortress::{CheckReport, Fortress};

// ── Vault ───────────────────────────────────────────────────────────

pub use self::vault::{CryptoVault, KeySource, MASTER_KEY_ENV};

// ── Audit Log ───────────────────────────────────────────────────────

pub use self::audit::{AuditEntry, AuditLevel, AuditLog, ChainStatus};

// ── Integrity Store ─────────────────────────────────────────────────

pub use self::integrity::{IntegritySnapshot, IntegrityStore, VerifyOutcome};

// ── Symlink Guardian ────────────────────────────────────────────────

pub use self::symlink::{RepairOutcome, SymlinkRecord, SymlinkState};

// ── Permission Validator ────────────────────────────────────────────

pub use self::validator::{
    PermissionPolicy, SettingsDoc, ValidationResult, check_file_security, parse_settings,
    repair_policy, validate,
};

// ── Backups ─────────────────────────────────────────────────────────

pub use self::backup::{BackupRecord, create_backup, read_backup};
