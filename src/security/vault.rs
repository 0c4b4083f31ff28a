//! Symmetric key management and authenticated encryption.
//!
//! The vault key comes from one of two sources:
//!
//! - **Environment**: if `FORTRESS_MASTER_KEY` is set and non-empty, the
//!   key is the SHA-256 of its value. Deterministic, so every instance
//!   in the same environment derives byte-identical keys.
//! - **Persisted file**: otherwise `.claude/security/vault.key` holds 32
//!   bytes from the OS CSPRNG, generated on first use and written with
//!   0600 permissions (Unix).
//!
//! Encryption is XChaCha20-Poly1305. Each blob is a fresh random 24-byte
//! nonce followed by ciphertext+tag; decryption authenticates before
//! returning plaintext and fails with an integrity error on any
//! tampering or key mismatch — never silently returning garbage.

use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngExt;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::{FortressError, Result};
use crate::paths::FortressPaths;

/// Environment override for the vault key source.
pub const MASTER_KEY_ENV: &str = "FORTRESS_MASTER_KEY";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 24;

/// Where the active key came from. Environment keys cannot be rotated
/// by the fortress — it does not own that material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Environment,
    PersistedFile,
}

/// Holds the derived symmetric key and exposes authenticated
/// encrypt/decrypt over it.
pub struct CryptoVault {
    key: [u8; KEY_LEN],
    source: KeySource,
}

impl CryptoVault {
    /// Derive or load the key for this project/home context.
    ///
    /// Two vaults opened against the same context always hold
    /// byte-identical keys: the environment derivation is a pure hash,
    /// and the file path persists across instances.
    pub fn open(paths: &FortressPaths) -> Result<Self> {
        if let Ok(master) = std::env::var(MASTER_KEY_ENV)
            && !master.is_empty()
        {
            let mut hasher = Sha256::new();
            hasher.update(master.as_bytes());
            let key: [u8; KEY_LEN] = hasher.finalize().into();
            return Ok(Self {
                key,
                source: KeySource::Environment,
            });
        }

        let key = ensure_key_file(&paths.vault_key())?;
        Ok(Self {
            key,
            source: KeySource::PersistedFile,
        })
    }

    pub fn source(&self) -> KeySource {
        self.source
    }

    /// Encrypt plaintext. Output: nonce ‖ ciphertext+tag.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = XChaCha20Poly1305::new((&self.key).into());
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| FortressError::Crypto("encryption failed".into()))?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(blob)
    }

    /// Decrypt and authenticate a blob produced by [`encrypt`](Self::encrypt).
    ///
    /// A truncated blob, a flipped byte anywhere, or a wrong key all
    /// fail with [`FortressError::Integrity`].
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>> {
        if blob.len() < NONCE_LEN {
            return Err(FortressError::Integrity(
                "encrypted blob too short to contain a nonce".into(),
            ));
        }
        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let cipher = XChaCha20Poly1305::new((&self.key).into());
        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| FortressError::Integrity("authenticated decryption failed".into()))
    }

    /// Replace the persisted key with fresh CSPRNG material and return a
    /// vault holding the new key. The caller is responsible for having
    /// re-encrypted everything sealed under the old key first.
    pub fn rotate(paths: &FortressPaths) -> Result<Self> {
        if std::env::var(MASTER_KEY_ENV).is_ok_and(|v| !v.is_empty()) {
            return Err(FortressError::Crypto(format!(
                "cannot rotate a key supplied via {MASTER_KEY_ENV}"
            )));
        }

        let key = generate_key();
        write_secret(&paths.vault_key(), &key)?;
        tracing::info!("Rotated vault key at {}", paths.vault_key().display());
        Ok(Self {
            key,
            source: KeySource::PersistedFile,
        })
    }
}

/// Read the key file, generating and persisting one on first use.
fn ensure_key_file(key_path: &Path) -> Result<[u8; KEY_LEN]> {
    if key_path.exists() {
        let bytes = fs::read(key_path)?;
        if bytes.len() != KEY_LEN {
            return Err(FortressError::Crypto(format!(
                "vault key has unexpected length {} (expected {KEY_LEN})",
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&bytes);
        return Ok(key);
    }

    let key = generate_key();
    write_secret(key_path, &key)?;
    tracing::info!("Generated vault key at {}", key_path.display());
    Ok(key)
}

fn generate_key() -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    rand::rng().fill(&mut key);
    key
}

/// Write secret material with owner-only permissions.
pub(crate) fn write_secret(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
