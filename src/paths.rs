//! Path resolution for the protected settings layout.
//!
//! Everything the fortress touches is anchored to two directories: the
//! project root (contains `.claude/`) and the user's home (contains
//! `~/.claude/settings.json`, the canonical settings). Both are captured
//! once at startup; tests construct [`FortressPaths::new`] against temp
//! directories instead of touching the real home.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolved paths for the entire fortress.
///
/// Created once at startup and threaded through every component.
/// All paths are absolute.
#[derive(Debug, Clone)]
pub struct FortressPaths {
    /// Project root: the directory whose `.claude/settings.local.json`
    /// is being guarded.
    pub project_root: PathBuf,

    /// User home: contains the canonical `~/.claude/settings.json`.
    pub home: PathBuf,
}

impl FortressPaths {
    /// Anchor to explicit directories. Used by tests and by callers that
    /// guard a project other than the current working directory.
    pub fn new(project_root: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            home: home.into(),
        }
    }

    /// Resolve against the real environment: cwd + platform home.
    pub fn resolve() -> Result<Self> {
        let project_root = std::env::current_dir().context("Failed to resolve working directory")?;
        let home = etcetera::home_dir().context("Failed to resolve home directory")?;
        Ok(Self { project_root, home })
    }

    // ── Convenience accessors for specific files ──

    /// Project `.claude/` directory.
    pub fn claude_dir(&self) -> PathBuf {
        self.project_root.join(".claude")
    }

    /// Canonical global settings: `~/.claude/settings.json`.
    pub fn global_settings(&self) -> PathBuf {
        self.home.join(".claude").join("settings.json")
    }

    /// Local settings: `.claude/settings.local.json` — must be a symlink
    /// to the global settings.
    pub fn local_settings(&self) -> PathBuf {
        self.claude_dir().join("settings.local.json")
    }

    /// Security state directory: `.claude/security/`.
    pub fn security_dir(&self) -> PathBuf {
        self.claude_dir().join("security")
    }

    /// Encrypted integrity snapshot: `.claude/security/integrity.enc`.
    pub fn integrity_store(&self) -> PathBuf {
        self.security_dir().join("integrity.enc")
    }

    /// HMAC-chained audit log: `.claude/security/audit.log`.
    pub fn audit_log(&self) -> PathBuf {
        self.security_dir().join("audit.log")
    }

    /// Persisted vault key material (absent when `FORTRESS_MASTER_KEY`
    /// is supplied): `.claude/security/vault.key`.
    pub fn vault_key(&self) -> PathBuf {
        self.security_dir().join("vault.key")
    }

    /// Persisted audit MAC secret: `.claude/security/audit.key`.
    /// Separate from the vault key so key rotation never invalidates
    /// the existing audit chain.
    pub fn audit_key(&self) -> PathBuf {
        self.security_dir().join("audit.key")
    }

    /// Encrypted pre-repair backups: `.claude/security/backups/`.
    pub fn backups_dir(&self) -> PathBuf {
        self.security_dir().join("backups")
    }

    /// Advisory lock file serializing repairs: `.claude/security/repair.lock`.
    pub fn repair_lock(&self) -> PathBuf {
        self.security_dir().join("repair.lock")
    }

    /// Roots a local-settings symlink target may resolve under.
    pub fn allowed_roots(&self) -> Vec<PathBuf> {
        vec![self.home.join(".claude"), self.claude_dir()]
    }

    /// The immutable set of files monitored by the integrity store.
    pub fn protected_files(&self) -> Vec<PathBuf> {
        vec![self.global_settings(), self.local_settings()]
    }

    /// Create all fortress directories with owner-only permissions.
    pub fn ensure_dirs(&self) -> Result<()> {
        let dirs = [
            self.claude_dir(),
            self.security_dir(),
            self.backups_dir(),
            self.home.join(".claude"),
        ];

        for dir in &dirs {
            create_dir_with_mode(dir)?;
        }

        Ok(())
    }
}

/// Create a directory with mode 0700.
fn create_dir_with_mode(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}
