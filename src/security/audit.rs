//! Append-only, HMAC-chained security audit log.
//!
//! Stored at `.claude/security/audit.log`, one entry per line:
//!
//! ```text
//! epoch_ts|LEVEL|message|hex_mac
//! ```
//!
//! Each entry's MAC is computed over the previous entry's MAC plus the
//! entry's own fields, forming a tamper-evident chain:
//!
//! ```text
//! mac = HMAC-SHA256(key, prev_mac|seq|timestamp|level|message)
//! ```
//!
//! The first entry chains from a fixed genesis value (64 ASCII zeros).
//! The log is deliberately **not** encrypted — audit trails must remain
//! independently inspectable — but any edit after the fact breaks the
//! chain at the edited entry. Tamper-evident, not tamper-proof.
//!
//! The MAC secret lives in its own key file (`audit.key`), independent
//! of the vault key, so `rotate-key` never invalidates the chain.

use hmac::{Hmac, Mac};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{FortressError, Result};
use crate::security::vault;

type HmacSha256 = Hmac<sha2::Sha256>;

/// Chain seed for the first entry (no predecessor).
const GENESIS_MAC: &str = "0000000000000000000000000000000000000000000000000000000000000000";

const MAC_KEY_LEN: usize = 32;

/// Severity attached to each audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl AuditLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Success => "SUCCESS",
            AuditLevel::Warning => "WARNING",
            AuditLevel::Error => "ERROR",
            AuditLevel::Critical => "CRITICAL",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "INFO" => Some(AuditLevel::Info),
            "SUCCESS" => Some(AuditLevel::Success),
            "WARNING" => Some(AuditLevel::Warning),
            "ERROR" => Some(AuditLevel::Error),
            "CRITICAL" => Some(AuditLevel::Critical),
            _ => None,
        }
    }
}

/// One parsed line of the audit log.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub seq: u64,
    pub timestamp: i64,
    pub level: AuditLevel,
    pub message: String,
    pub mac: String,
}

/// Result of a forward chain verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    Intact { entries: usize },
    /// Index of the first entry whose stored MAC does not match the
    /// recomputed one (or that cannot be parsed at all).
    TamperedAt(usize),
}

/// Append-only audit log with a dedicated MAC secret.
pub struct AuditLog {
    path: PathBuf,
    mac_key: [u8; MAC_KEY_LEN],
}

impl AuditLog {
    /// Open the log, generating the MAC secret on first use.
    pub fn open(path: PathBuf, key_path: &Path) -> Result<Self> {
        let mac_key = ensure_mac_key(key_path)?;
        Ok(Self { path, mac_key })
    }

    /// Append a single entry, chained to the previous one.
    ///
    /// Messages must carry event names and paths only — callers never
    /// pass key bytes or raw file contents.
    pub fn append(&self, level: AuditLevel, message: &str) -> Result<()> {
        let (prev_mac, seq) = self.chain_tail()?;
        let timestamp = chrono::Utc::now().timestamp();

        let mac = self.entry_mac(&prev_mac, seq, timestamp, level, message);
        let line = format!("{}|{}|{}|{}", timestamp, level.as_str(), message, mac);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let created = !self.path.exists();
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        #[cfg(unix)]
        if created {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Parse all entries for display. A malformed line surfaces as an
    /// integrity failure naming its index, not a crash.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut entries = Vec::new();
        for (i, line) in content.lines().filter(|l| !l.is_empty()).enumerate() {
            let entry = parse_line(line, i as u64).ok_or_else(|| {
                FortressError::Integrity(format!("audit log entry {i} is malformed"))
            })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Recompute MACs from the first entry forward.
    ///
    /// Stops at the first entry whose stored MAC does not match and
    /// reports its index; an empty or missing log is trivially intact.
    pub fn verify_chain(&self) -> Result<ChainStatus> {
        if !self.path.exists() {
            return Ok(ChainStatus::Intact { entries: 0 });
        }

        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();

        let mut prev_mac = GENESIS_MAC.to_string();
        for (i, line) in lines.iter().enumerate() {
            let Some(entry) = parse_line(line, i as u64) else {
                return Ok(ChainStatus::TamperedAt(i));
            };
            let expected =
                self.entry_mac(&prev_mac, entry.seq, entry.timestamp, entry.level, &entry.message);
            if expected != entry.mac {
                return Ok(ChainStatus::TamperedAt(i));
            }
            prev_mac = entry.mac;
        }

        Ok(ChainStatus::Intact {
            entries: lines.len(),
        })
    }

    /// Recover the previous MAC and next sequence number from the last
    /// line. An unparseable last line keeps the log appendable: the new
    /// entry chains from the HMAC of the raw line, and verification
    /// still localizes the damage to the corrupted index.
    fn chain_tail(&self) -> Result<(String, u64)> {
        if !self.path.exists() {
            return Ok((GENESIS_MAC.to_string(), 0));
        }

        let content = fs::read_to_string(&self.path)?;
        let lines: Vec<&str> = content.lines().filter(|l| !l.is_empty()).collect();
        let seq = lines.len() as u64;

        match lines.last() {
            None => Ok((GENESIS_MAC.to_string(), 0)),
            Some(last) => match parse_line(last, seq - 1) {
                Some(entry) => Ok((entry.mac, seq)),
                None => {
                    tracing::warn!("Last audit entry is malformed; chaining from raw bytes");
                    Ok((self.raw_mac(last.as_bytes()), seq))
                }
            },
        }
    }

    fn entry_mac(
        &self,
        prev_mac: &str,
        seq: u64,
        timestamp: i64,
        level: AuditLevel,
        message: &str,
    ) -> String {
        let input = format!(
            "{}|{}|{}|{}|{}",
            prev_mac,
            seq,
            timestamp,
            level.as_str(),
            message
        );
        self.raw_mac(input.as_bytes())
    }

    fn raw_mac(&self, data: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.mac_key)
            .expect("HMAC accepts any key length");
        mac.update(data);
        hex_encode(&mac.finalize().into_bytes())
    }
}

/// Parse `ts|LEVEL|message|mac`. The message may itself contain pipes;
/// the MAC is the final field and the timestamp/level the first two.
fn parse_line(line: &str, seq: u64) -> Option<AuditEntry> {
    let (ts_str, rest) = line.split_once('|')?;
    let (level_str, rest) = rest.split_once('|')?;
    let (message, mac) = rest.rsplit_once('|')?;

    let timestamp: i64 = ts_str.parse().ok()?;
    let level = AuditLevel::parse(level_str)?;
    if mac.len() != 64 || !mac.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    Some(AuditEntry {
        seq,
        timestamp,
        level,
        message: message.to_string(),
        mac: mac.to_string(),
    })
}

/// Ensure the audit MAC secret exists, generating it on first use.
fn ensure_mac_key(key_path: &Path) -> Result<[u8; MAC_KEY_LEN]> {
    if key_path.exists() {
        let bytes = fs::read(key_path)?;
        if bytes.len() != MAC_KEY_LEN {
            return Err(FortressError::Crypto(format!(
                "audit key has unexpected length {} (expected {MAC_KEY_LEN})",
                bytes.len()
            )));
        }
        let mut key = [0u8; MAC_KEY_LEN];
        key.copy_from_slice(&bytes);
        return Ok(key);
    }

    use rand::RngExt;
    let mut key = [0u8; MAC_KEY_LEN];
    rand::rng().fill(&mut key);
    vault::write_secret(key_path, &key)?;
    tracing::info!("Generated audit MAC key at {}", key_path.display());
    Ok(key)
}

/// Hex-encode a byte slice.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
