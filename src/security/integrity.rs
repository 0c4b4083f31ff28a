//! Encrypted, versioned snapshot of protected-file checksums.
//!
//! The snapshot maps each protected file to the SHA-256 of its bytes
//! and is persisted only as a vault-encrypted blob at
//! `.claude/security/integrity.enc` — the on-disk form is never valid
//! plaintext JSON. The snapshot is replaced wholesale by `reseal()`
//! (write-to-temp + rename, never an in-place truncate) and compared
//! against live hashes by `verify()`.
//!
//! Drift is always surfaced, never silently overwritten: the
//! orchestrator verifies before every reseal except the explicit
//! accept-baseline path. A missing store is the first-run case and is
//! not an error — the first `reseal()` establishes the baseline.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{FortressError, Result};
use crate::security::vault::CryptoVault;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Whole-snapshot state, owned exclusively by [`IntegrityStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegritySnapshot {
    pub format_version: u32,
    /// Epoch seconds at seal time.
    pub sealed_at: i64,
    /// Protected path -> SHA-256 hex of its bytes at seal time.
    pub files: BTreeMap<String, String>,
}

/// Outcome of a successful verification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// No store on disk yet — first run, baseline not established.
    NoBaseline,
    Verified { files: usize },
}

/// Detects tampering of the protected files via sealed checksums.
pub struct IntegrityStore {
    store_path: PathBuf,
    protected: Vec<PathBuf>,
}

impl IntegrityStore {
    pub fn new(store_path: PathBuf, protected: Vec<PathBuf>) -> Self {
        Self {
            store_path,
            protected,
        }
    }

    /// Hash every protected file and atomically replace the store.
    ///
    /// Files that do not currently exist are simply absent from the new
    /// snapshot. Returns the snapshot that was sealed.
    pub fn reseal(&self, vault: &CryptoVault) -> Result<IntegritySnapshot> {
        let snapshot = IntegritySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            sealed_at: chrono::Utc::now().timestamp(),
            files: self.current_hashes()?,
        };

        self.persist(vault, &snapshot)?;
        debug!("Sealed integrity snapshot ({} files)", snapshot.files.len());
        Ok(snapshot)
    }

    /// Decrypt the store and compare each sealed hash against the live
    /// file.
    ///
    /// A changed file fails with [`FortressError::Integrity`] naming the
    /// offending path. A file that was sealed but has since disappeared
    /// is logged as a warning, not a failure — absence is visible to the
    /// symlink check, and failing here would make every repair of a
    /// deleted link double-report.
    pub fn verify(&self, vault: &CryptoVault) -> Result<VerifyOutcome> {
        let Some(snapshot) = self.load(vault)? else {
            return Ok(VerifyOutcome::NoBaseline);
        };

        for (path_str, sealed_hash) in &snapshot.files {
            let path = Path::new(path_str);
            if !path.exists() {
                warn!("Sealed file missing from disk: {}", path_str);
                continue;
            }
            let live_hash = sha256_hex_file(path)?;
            if &live_hash != sealed_hash {
                return Err(FortressError::Integrity(format!(
                    "checksum mismatch for {path_str}"
                )));
            }
        }

        Ok(VerifyOutcome::Verified {
            files: snapshot.files.len(),
        })
    }

    /// Decrypt and parse the current snapshot, or `None` when no store
    /// exists yet.
    pub fn load(&self, vault: &CryptoVault) -> Result<Option<IntegritySnapshot>> {
        if !self.store_path.exists() {
            return Ok(None);
        }

        let blob = fs::read(&self.store_path)?;
        let plaintext = vault.decrypt(&blob)?;
        let snapshot: IntegritySnapshot = serde_json::from_slice(&plaintext)
            .map_err(|_| FortressError::Integrity("integrity snapshot did not parse".into()))?;

        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(FortressError::Schema(format!(
                "unsupported integrity snapshot version {}",
                snapshot.format_version
            )));
        }

        Ok(Some(snapshot))
    }

    /// Encrypt and atomically write a snapshot (temp file in the store's
    /// own directory, then rename).
    pub fn persist(&self, vault: &CryptoVault, snapshot: &IntegritySnapshot) -> Result<()> {
        let plaintext = serde_json::to_vec(snapshot)?;
        let blob = vault.encrypt(&plaintext)?;

        let parent = self
            .store_path
            .parent()
            .ok_or_else(|| FortressError::Crypto("integrity store has no parent dir".into()))?;
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        std::io::Write::write_all(&mut tmp, &blob)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(&self.store_path)
            .map_err(|e| FortressError::Io(e.error))?;
        Ok(())
    }

    fn current_hashes(&self) -> Result<BTreeMap<String, String>> {
        let mut files = BTreeMap::new();
        for path in &self.protected {
            if !path.exists() {
                continue;
            }
            files.insert(path.display().to_string(), sha256_hex_file(path)?);
        }
        Ok(files)
    }
}

/// Hex-encoded SHA-256 of a file's bytes.
fn sha256_hex_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FortressPaths;

    fn setup() -> (tempfile::TempDir, FortressPaths, CryptoVault, IntegrityStore) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = FortressPaths::new(tmp.path().join("proj"), tmp.path().join("home"));
        paths.ensure_dirs().unwrap();
        let vault = CryptoVault::open(&paths).unwrap();
        let store = IntegrityStore::new(paths.integrity_store(), paths.protected_files());
        (tmp, paths, vault, store)
    }

    #[test]
    fn first_run_reports_no_baseline() {
        let (_tmp, _paths, vault, store) = setup();
        assert_eq!(store.verify(&vault).unwrap(), VerifyOutcome::NoBaseline);
    }

    #[test]
    fn seal_then_verify() {
        let (_tmp, paths, vault, store) = setup();
        fs::write(paths.global_settings(), "{\"permissions\":{}}").unwrap();

        let snapshot = store.reseal(&vault).unwrap();
        assert_eq!(snapshot.format_version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(snapshot.files.len(), 1);

        assert_eq!(
            store.verify(&vault).unwrap(),
            VerifyOutcome::Verified { files: 1 }
        );
    }

    #[test]
    fn modified_file_fails_naming_the_path() {
        let (_tmp, paths, vault, store) = setup();
        let global = paths.global_settings();
        fs::write(&global, "original").unwrap();
        store.reseal(&vault).unwrap();

        fs::write(&global, "tampered").unwrap();

        let err = store.verify(&vault).unwrap_err();
        match err {
            FortressError::Integrity(msg) => {
                assert!(msg.contains("settings.json"), "message: {msg}")
            }
            other => panic!("expected Integrity, got {other:?}"),
        }
    }

    #[test]
    fn store_is_not_plaintext_and_tamper_fails_decrypt() {
        let (_tmp, paths, vault, store) = setup();
        fs::write(paths.global_settings(), "content").unwrap();
        store.reseal(&vault).unwrap();

        let store_path = paths.integrity_store();
        let mut blob = fs::read(&store_path).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&blob).is_err());

        // Flip one byte anywhere in the sealed blob
        let mid = blob.len() / 2;
        blob[mid] ^= 0x01;
        fs::write(&store_path, &blob).unwrap();

        assert!(matches!(
            store.verify(&vault),
            Err(FortressError::Integrity(_))
        ));
    }

    #[test]
    fn sealed_file_missing_is_a_warning_not_a_failure() {
        let (_tmp, paths, vault, store) = setup();
        let global = paths.global_settings();
        fs::write(&global, "here today").unwrap();
        store.reseal(&vault).unwrap();

        fs::remove_file(&global).unwrap();

        assert_eq!(
            store.verify(&vault).unwrap(),
            VerifyOutcome::Verified { files: 1 }
        );
    }

    #[test]
    fn reseal_replaces_wholesale() {
        let (_tmp, paths, vault, store) = setup();
        let global = paths.global_settings();
        fs::write(&global, "v1").unwrap();
        store.reseal(&vault).unwrap();

        fs::remove_file(&global).unwrap();
        let snapshot = store.reseal(&vault).unwrap();

        // The old entry is gone, not carried forward
        assert!(snapshot.files.is_empty());
        assert_eq!(
            store.verify(&vault).unwrap(),
            VerifyOutcome::Verified { files: 0 }
        );
    }
}
