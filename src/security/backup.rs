//! Encrypted pre-repair backups of settings content.
//!
//! Every destructive rewrite is preceded by a [`BackupRecord`] capturing
//! the file's exact content plus enough metadata to audit what was
//! replaced. Records are vault-encrypted on disk
//! (`.claude/security/backups/backup_<epoch_ts>.enc`) and never deleted
//! automatically.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{FortressError, Result};
use crate::security::vault::{self, CryptoVault};

/// One captured pre-repair state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: String,
    /// Epoch seconds at capture time.
    pub created_at: i64,
    pub original_path: String,
    /// SHA-256 hex of the payload, for audit cross-checks.
    pub original_sha256: String,
    pub payload: String,
}

/// Capture `original` into a new encrypted backup.
///
/// Returns the backup file path, or `None` when there is nothing to
/// back up (the original does not exist).
pub fn create_backup(
    backups_dir: &Path,
    vault: &CryptoVault,
    original: &Path,
) -> Result<Option<PathBuf>> {
    if !original.exists() {
        return Ok(None);
    }

    let payload = fs::read_to_string(original)?;
    let created_at = chrono::Utc::now().timestamp();
    let (id, backup_path) = next_backup_slot(backups_dir, created_at);

    let record = BackupRecord {
        id,
        created_at,
        original_path: original.display().to_string(),
        original_sha256: sha256_hex(payload.as_bytes()),
        payload,
    };

    let blob = vault.encrypt(&serde_json::to_vec(&record)?)?;
    fs::create_dir_all(backups_dir)?;
    vault::write_secret(&backup_path, &blob)?;

    info!("Backed up {} to {}", original.display(), backup_path.display());
    Ok(Some(backup_path))
}

/// Decrypt and parse one backup file.
pub fn read_backup(path: &Path, vault: &CryptoVault) -> Result<BackupRecord> {
    let blob = fs::read(path)?;
    let plaintext = vault.decrypt(&blob)?;
    serde_json::from_slice(&plaintext)
        .map_err(|_| FortressError::Integrity("backup record did not parse".into()))
}

/// Re-encrypt every backup under a new key. Used by key rotation.
pub fn reencrypt_all(
    backups_dir: &Path,
    old_vault: &CryptoVault,
    new_vault: &CryptoVault,
) -> Result<usize> {
    if !backups_dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in fs::read_dir(backups_dir)? {
        let path = entry?.path();
        if path.extension().is_none_or(|e| e != "enc") {
            continue;
        }
        let blob = fs::read(&path)?;
        let plaintext = old_vault.decrypt(&blob)?;
        vault::write_secret(&path, &new_vault.encrypt(&plaintext)?)?;
        count += 1;
    }
    Ok(count)
}

/// Pick an unused `backup_<ts>.enc` name, suffixing a counter when
/// several backups land in the same second.
fn next_backup_slot(backups_dir: &Path, created_at: i64) -> (String, PathBuf) {
    let base = format!("backup_{created_at}");
    let candidate = backups_dir.join(format!("{base}.enc"));
    if !candidate.exists() {
        return (base, candidate);
    }
    let mut n = 1;
    loop {
        let id = format!("{base}_{n}");
        let path = backups_dir.join(format!("{id}.enc"));
        if !path.exists() {
            return (id, path);
        }
        n += 1;
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FortressPaths;

    fn setup() -> (tempfile::TempDir, FortressPaths, CryptoVault) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = FortressPaths::new(tmp.path().join("proj"), tmp.path().join("home"));
        paths.ensure_dirs().unwrap();
        let vault = CryptoVault::open(&paths).unwrap();
        (tmp, paths, vault)
    }

    #[test]
    fn capture_and_read_roundtrip() {
        let (_tmp, paths, vault) = setup();
        let original = paths.local_settings();
        fs::write(&original, "{\"was\": \"a regular file\"}").unwrap();

        let backup_path = create_backup(&paths.backups_dir(), &vault, &original)
            .unwrap()
            .unwrap();

        let record = read_backup(&backup_path, &vault).unwrap();
        assert_eq!(record.payload, "{\"was\": \"a regular file\"}");
        assert_eq!(record.original_path, original.display().to_string());
        assert_eq!(record.original_sha256, sha256_hex(record.payload.as_bytes()));
    }

    #[test]
    fn backup_on_disk_is_not_plaintext() {
        let (_tmp, paths, vault) = setup();
        let original = paths.local_settings();
        fs::write(&original, "{\"sensitive\": true}").unwrap();

        let backup_path = create_backup(&paths.backups_dir(), &vault, &original)
            .unwrap()
            .unwrap();

        let raw = fs::read(&backup_path).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());
    }

    #[test]
    fn missing_original_yields_none() {
        let (_tmp, paths, vault) = setup();
        let result = create_backup(&paths.backups_dir(), &vault, &paths.local_settings()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn same_second_backups_get_distinct_names() {
        let (_tmp, paths, vault) = setup();
        let original = paths.local_settings();
        fs::write(&original, "v1").unwrap();

        let p1 = create_backup(&paths.backups_dir(), &vault, &original)
            .unwrap()
            .unwrap();
        fs::write(&original, "v2").unwrap();
        let p2 = create_backup(&paths.backups_dir(), &vault, &original)
            .unwrap()
            .unwrap();

        assert_ne!(p1, p2);
        assert_eq!(read_backup(&p2, &vault).unwrap().payload, "v2");
    }

    #[test]
    fn reencrypt_moves_backups_to_new_key() {
        let (_tmp, paths, old_vault) = setup();
        let original = paths.local_settings();
        fs::write(&original, "pre-rotation content").unwrap();
        create_backup(&paths.backups_dir(), &old_vault, &original).unwrap();

        let new_vault = CryptoVault::rotate(&paths).unwrap();

        let count = reencrypt_all(&paths.backups_dir(), &old_vault, &new_vault).unwrap();
        assert_eq!(count, 1);

        let entry = fs::read_dir(paths.backups_dir())
            .unwrap()
            .next()
            .unwrap()
            .unwrap();
        let record = read_backup(&entry.path(), &new_vault).unwrap();
        assert_eq!(record.payload, "pre-rotation content");

        // The old key no longer opens it
        assert!(read_backup(&entry.path(), &old_vault).is_err());
    }
}
