//! Symlink verification and lock-coordinated atomic repair.
//!
//! The local settings path must be either a symlink resolving to the
//! canonical global settings under an allowed root, or entirely absent.
//! Verification classifies everything else — a regular file, a dangling
//! link, a link escaping the allowed roots — as unhealthy, and repair
//! replaces it atomically: temp symlink beside the target, verify,
//! rename. Repair runs only while the caller holds the repair lock and
//! re-verifies after acquisition, closing the TOCTOU window between an
//! unlocked health check and the repair itself.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::concurrency::RepairLockGuard;
use crate::error::Result;

/// Raw-target path segments that indicate a hijack through a
/// world-writable staging directory. Rejected even when the target
/// chain happens to resolve to the right file, because every hop
/// through such a directory is attacker-substitutable.
const SUSPICIOUS_SEGMENTS: &[&str] = &["/tmp/", "/var/folders/", "/T/"];

/// Classification of the local settings path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkState {
    /// Symlink resolving to the canonical global settings under an
    /// allowed root.
    Valid,
    /// Nothing at the local path.
    Missing,
    /// A filesystem entry exists but is not a symlink.
    WrongType,
    /// A symlink that is dangling, points to the wrong file, or
    /// escapes all allowed roots.
    DanglingOrMalicious,
}

/// What `repair` did. `AlreadyValid` and `Repaired` both leave the
/// postcondition `Valid`; at most one concurrent caller per unhealthy
/// episode observes `Repaired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    AlreadyValid,
    Repaired,
    Failed,
}

impl RepairOutcome {
    pub fn is_valid(self) -> bool {
        matches!(self, RepairOutcome::AlreadyValid | RepairOutcome::Repaired)
    }
}

/// Ephemeral verification record — computed fresh on every call, never
/// cached across anything that mutates the filesystem.
#[derive(Debug, Clone)]
pub struct SymlinkRecord {
    pub local_path: PathBuf,
    pub resolved_target: Option<PathBuf>,
    pub is_symlink: bool,
    pub target_in_allowed_roots: bool,
    pub state: SymlinkState,
}

/// Verify the local settings path against the canonical global path.
///
/// Reads are lock-free: a transient mid-repair absence is reported as
/// `Missing`, never a crash.
pub fn verify(local: &Path, global: &Path, allowed_roots: &[PathBuf]) -> SymlinkRecord {
    let unhealthy = |state, is_symlink, resolved: Option<PathBuf>, in_roots| SymlinkRecord {
        local_path: local.to_path_buf(),
        resolved_target: resolved,
        is_symlink,
        target_in_allowed_roots: in_roots,
        state,
    };

    let meta = match fs::symlink_metadata(local) {
        Ok(meta) => meta,
        Err(_) => return unhealthy(SymlinkState::Missing, false, None, false),
    };

    if !meta.file_type().is_symlink() {
        warn!("Local settings is not a symlink: {}", local.display());
        return unhealthy(SymlinkState::WrongType, false, None, false);
    }

    // Raw (unresolved) target: reject temp-directory hops outright.
    // Skipped when the canonical target itself lives under a temp
    // directory, i.e. the whole installation is a test fixture.
    if let Ok(raw) = fs::read_link(local) {
        let raw_str = raw.to_string_lossy();
        let global_str = global.to_string_lossy();
        let global_in_temp = SUSPICIOUS_SEGMENTS.iter().any(|s| global_str.contains(s));
        if !global_in_temp
            && SUSPICIOUS_SEGMENTS.iter().any(|s| raw_str.contains(s))
        {
            warn!(
                "Symlink raw target passes through a temp directory: {}",
                raw_str
            );
            return unhealthy(SymlinkState::DanglingOrMalicious, true, None, false);
        }
    }

    // Canonical resolution follows the final target; a dangling link
    // fails here.
    let resolved = match fs::canonicalize(local) {
        Ok(p) => p,
        Err(_) => {
            warn!("Symlink is dangling: {}", local.display());
            return unhealthy(SymlinkState::DanglingOrMalicious, true, None, false);
        }
    };

    let canonical_global = match fs::canonicalize(global) {
        Ok(p) => p,
        Err(_) => {
            warn!("Global settings missing: {}", global.display());
            return unhealthy(
                SymlinkState::DanglingOrMalicious,
                true,
                Some(resolved),
                false,
            );
        }
    };

    // Containment via canonicalized prefixes — `..` traversal cannot
    // escape a root it does not actually leave.
    let in_roots = allowed_roots.iter().any(|root| {
        fs::canonicalize(root)
            .map(|canonical_root| resolved.starts_with(&canonical_root))
            .unwrap_or(false)
    });

    if resolved == canonical_global && in_roots {
        debug!("Symlink healthy: {} -> {}", local.display(), resolved.display());
        return SymlinkRecord {
            local_path: local.to_path_buf(),
            resolved_target: Some(resolved),
            is_symlink: true,
            target_in_allowed_roots: true,
            state: SymlinkState::Valid,
        };
    }

    warn!(
        "Symlink target mismatch: {} resolves to {} (expected {})",
        local.display(),
        resolved.display(),
        canonical_global.display()
    );
    unhealthy(
        SymlinkState::DanglingOrMalicious,
        true,
        Some(resolved),
        in_roots,
    )
}

/// Atomically repair the local settings symlink. Callable only while
/// holding the repair lock.
///
/// Re-verifies under the lock first — an already-`Valid` link is an
/// idempotent no-op. Otherwise: remove whatever entry exists at `local`
/// (operating on the entry itself, never following a malicious target),
/// create a temp symlink beside it, verify the temp link, rename it
/// over `local`, and re-verify. No automatic retry on failure.
pub fn repair(
    local: &Path,
    global: &Path,
    allowed_roots: &[PathBuf],
    _guard: &RepairLockGuard,
) -> Result<RepairOutcome> {
    // Double-check under the lock: another process may have repaired
    // between the caller's health check and lock acquisition.
    if verify(local, global, allowed_roots).state == SymlinkState::Valid {
        return Ok(RepairOutcome::AlreadyValid);
    }

    // Remove the existing entry, whatever it is. symlink_metadata keeps
    // this an lstat: the link itself goes, its target is never touched.
    if fs::symlink_metadata(local).is_ok() {
        fs::remove_file(local)?;
    }

    let tmp = temp_link_path(local);
    if fs::symlink_metadata(&tmp).is_ok() {
        fs::remove_file(&tmp)?;
    }

    create_symlink(global, &tmp)?;

    if verify(&tmp, global, allowed_roots).state != SymlinkState::Valid {
        warn!("Temp symlink failed verification; aborting repair");
        let _ = fs::remove_file(&tmp);
        return Ok(RepairOutcome::Failed);
    }

    fs::rename(&tmp, local)?;

    if verify(local, global, allowed_roots).state == SymlinkState::Valid {
        debug!("Symlink repaired: {} -> {}", local.display(), global.display());
        Ok(RepairOutcome::Repaired)
    } else {
        warn!("Symlink unhealthy after repair: {}", local.display());
        Ok(RepairOutcome::Failed)
    }
}

fn temp_link_path(local: &Path) -> PathBuf {
    let name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.local.json".into());
    local.with_file_name(format!("{name}.tmp"))
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(target, link)?;
    Ok(())
}

#[cfg(windows)]
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(target, link)?;
    Ok(())
}
