//! Fortress orchestrator: composes the vault, audit log, integrity
//! store, symlink guardian, and permission validator into the public
//! `check` / `fortress_check` / `repair` / `rotate-key` operations.
//!
//! Ordering invariants:
//!
//! - Every destructive rewrite is preceded by an encrypted backup of
//!   the content being replaced.
//! - All mutations run under the repair lock with a bounded timeout.
//! - The integrity store is verified before every reseal except the
//!   explicit accept-baseline path, so external drift is surfaced and
//!   never silently overwritten. An integrity failure is logged
//!   CRITICAL, appended to the audit log, and re-raised — never
//!   swallowed, never auto-resolved.
//! - Every state transition lands in the audit log.

use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::concurrency::{DEFAULT_LOCK_TIMEOUT, RepairLock};
use crate::error::{FortressError, Result};
use crate::paths::FortressPaths;
use crate::security::audit::{AuditLevel, AuditLog};
use crate::security::backup;
use crate::security::integrity::{IntegrityStore, VerifyOutcome};
use crate::security::symlink::{self, SymlinkRecord, SymlinkState};
use crate::security::validator::{self, PermissionPolicy, SettingsDoc, ValidationResult};
use crate::security::vault::CryptoVault;

/// Aggregate result of one read-only check pass.
#[derive(Debug)]
pub struct CheckReport {
    pub symlink: SymlinkRecord,
    pub integrity: VerifyOutcome,
    /// `None` when the settings could not be read or parsed.
    pub validation: Option<ValidationResult>,
    pub healthy: bool,
}

/// The orchestrator. Construct once per project context via
/// [`Fortress::open`]; all operations may be called from any number of
/// threads or processes concurrently.
pub struct Fortress {
    paths: FortressPaths,
    vault: CryptoVault,
    audit: AuditLog,
    integrity: IntegrityStore,
    lock: RepairLock,
    policy: PermissionPolicy,
    lock_timeout: Duration,
}

impl Fortress {
    /// Initialize directories, key material, and all components.
    pub fn open(paths: FortressPaths) -> Result<Self> {
        paths
            .ensure_dirs()
            .map_err(|e| FortressError::Crypto(format!("security infrastructure: {e}")))?;

        let vault = CryptoVault::open(&paths)?;
        let audit = AuditLog::open(paths.audit_log(), &paths.audit_key())?;
        let integrity = IntegrityStore::new(paths.integrity_store(), paths.protected_files());
        let lock = RepairLock::new(paths.repair_lock());

        Ok(Self {
            paths,
            vault,
            audit,
            integrity,
            lock,
            policy: PermissionPolicy::default(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Override the repair-lock budget (tests and impatient callers).
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn paths(&self) -> &FortressPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn vault(&self) -> &CryptoVault {
        &self.vault
    }

    pub fn policy(&self) -> &PermissionPolicy {
        &self.policy
    }

    /// Lock-free symlink classification. Recomputed on every call and
    /// free of audit side effects — suitable for tight polling loops.
    pub fn symlink_record(&self) -> SymlinkRecord {
        symlink::verify(
            &self.paths.local_settings(),
            &self.paths.global_settings(),
            &self.paths.allowed_roots(),
        )
    }

    /// Read-only health check: symlink, integrity store, permissions.
    ///
    /// An integrity failure is logged CRITICAL, audited, and re-raised.
    /// Everything else aggregates into `healthy` without stopping the
    /// pass. Tolerates transient mid-repair states by reporting them
    /// unhealthy rather than failing.
    pub fn check(&self) -> Result<CheckReport> {
        let symlink = self.symlink_record();

        let integrity = match self.integrity.verify(&self.vault) {
            Ok(outcome) => outcome,
            Err(e) => return self.raise_integrity(e),
        };

        let validation = match self.load_settings() {
            Ok(Some(doc)) => Some(validator::validate(&self.policy, &doc)),
            Ok(None) => {
                warn!("Global settings missing: {}", self.paths.global_settings().display());
                None
            }
            Err(FortressError::Schema(msg)) => {
                warn!("Settings failed schema validation: {msg}");
                self.audit
                    .append(AuditLevel::Warning, &format!("settings schema violation: {msg}"))?;
                None
            }
            Err(e) => return Err(e),
        };

        validator::check_file_security(&self.paths.global_settings());

        let healthy = symlink.state == SymlinkState::Valid
            && validation.as_ref().is_some_and(|v| v.valid);

        let outcome = if healthy {
            self.audit.append(AuditLevel::Info, "check passed: all systems healthy")?;
            "healthy"
        } else {
            self.audit.append(
                AuditLevel::Warning,
                &format!(
                    "check failed: symlink {:?}, permissions {}",
                    symlink.state,
                    validation
                        .as_ref()
                        .map(|v| if v.valid { "valid" } else { "invalid" })
                        .unwrap_or("unreadable")
                ),
            )?;
            "unhealthy"
        };
        info!("Fortress check: {outcome}");

        Ok(CheckReport {
            symlink,
            integrity,
            validation,
            healthy,
        })
    }

    /// Verify-then-repair: heal the symlink and the permission lists,
    /// then reseal. Returns the final health state.
    ///
    /// Under contention at most one caller performs each repair; the
    /// rest observe `Valid` after a short wait and no-op, or surface
    /// [`FortressError::LockTimeout`] without touching anything.
    pub fn fortress_check(&self) -> Result<bool> {
        let mut mutated = false;

        // 1. Symlink health, repairing under the lock if needed.
        let record = self.symlink_record();
        if record.state != SymlinkState::Valid {
            mutated |= self.repair_symlink_locked(&record)?;
        }

        // 2. Integrity of the (now-canonical) protected files. External
        // drift stops the pass here; our own symlink repair restores the
        // sealed content rather than changing it.
        let integrity_outcome = match self.integrity.verify(&self.vault) {
            Ok(outcome) => outcome,
            Err(e) => return self.raise_integrity(e),
        };

        // 3. Permission lists on the canonical settings.
        let doc = match self.load_settings() {
            Ok(Some(doc)) => doc,
            Ok(None) => SettingsDoc {
                allow: Vec::new(),
                deny: Vec::new(),
                extra: serde_json::Map::new(),
                permissions_extra: serde_json::Map::new(),
            },
            Err(FortressError::Schema(msg)) => {
                self.audit.append(
                    AuditLevel::Warning,
                    &format!("settings unparseable, rebuilding from policy: {msg}"),
                )?;
                SettingsDoc {
                    allow: Vec::new(),
                    deny: Vec::new(),
                    extra: serde_json::Map::new(),
                    permissions_extra: serde_json::Map::new(),
                }
            }
            Err(e) => return Err(e),
        };

        let result = validator::validate(&self.policy, &doc);
        if !result.valid {
            if result.security_violation {
                error!("Dangerous grants allowed without deny: {:?}", result.dangerous_entries);
                self.audit.append(
                    AuditLevel::Critical,
                    &format!(
                        "security violation: {} dangerous grant(s) without matching deny",
                        result.dangerous_entries.len()
                    ),
                )?;
            }
            self.repair_permissions_locked(&doc, &result)?;
            mutated = true;
        }

        // 4. Accept the audited repairs into a fresh baseline.
        if mutated || matches!(integrity_outcome, VerifyOutcome::NoBaseline) {
            self.integrity.reseal(&self.vault)?;
            self.audit.append(AuditLevel::Info, "integrity baseline resealed")?;
        }

        let healthy = self.check()?.healthy;
        if healthy {
            self.audit.append(AuditLevel::Success, "fortress secure: all systems operational")?;
        } else {
            self.audit.append(AuditLevel::Critical, "fortress check failed after repair")?;
        }
        Ok(healthy)
    }

    /// Repair only the symlink (CLI `repair`). Returns `true` when the
    /// postcondition is `Valid`.
    pub fn repair_symlink(&self) -> Result<bool> {
        let record = self.symlink_record();
        if record.state == SymlinkState::Valid {
            return Ok(true);
        }

        self.repair_symlink_locked(&record)?;

        let healthy = self.symlink_record().state == SymlinkState::Valid;

        if healthy {
            self.reseal_after_mutation()?;
        }
        Ok(healthy)
    }

    /// Explicit caller-acknowledged adoption of the current on-disk
    /// state as the new integrity baseline.
    pub fn accept_baseline(&self) -> Result<()> {
        let snapshot = self.integrity.reseal(&self.vault)?;
        self.audit.append(
            AuditLevel::Info,
            &format!("baseline accepted: {} file(s) sealed", snapshot.files.len()),
        )?;
        Ok(())
    }

    /// Re-encrypt the integrity store and all backups under a freshly
    /// derived key. The audit chain keeps its own secret and is
    /// unaffected.
    pub fn rotate_key(&mut self) -> Result<()> {
        let _guard = self.lock.acquire(self.lock_timeout)?;
        self.audit.append(AuditLevel::Info, "key rotation started")?;

        let snapshot = self.integrity.load(&self.vault)?;
        let new_vault = CryptoVault::rotate(&self.paths)?;

        let reencrypted = backup::reencrypt_all(&self.paths.backups_dir(), &self.vault, &new_vault)?;
        if let Some(snapshot) = &snapshot {
            self.integrity.persist(&new_vault, snapshot)?;
        }
        self.vault = new_vault;

        self.audit.append(
            AuditLevel::Success,
            &format!("key rotated: store re-sealed, {reencrypted} backup(s) re-encrypted"),
        )?;
        Ok(())
    }

    /// Full reset: back up everything, rewrite pristine policy-derived
    /// global settings, recreate the symlink, reseal, and run a final
    /// check. Destructive — callers must confirm first.
    pub fn reset(&self) -> Result<bool> {
        self.audit.append(AuditLevel::Warning, "full reset initiated")?;

        {
            let guard = self.lock.acquire(self.lock_timeout)?;

            backup::create_backup(
                &self.paths.backups_dir(),
                &self.vault,
                &self.paths.global_settings(),
            )?;
            let local = self.paths.local_settings();
            if fs::symlink_metadata(&local).is_ok_and(|m| !m.file_type().is_symlink()) {
                backup::create_backup(&self.paths.backups_dir(), &self.vault, &local)?;
            }
            if fs::symlink_metadata(&local).is_ok() {
                fs::remove_file(&local)?;
            }

            let pristine = SettingsDoc {
                allow: self.policy.required_allow.iter().cloned().collect(),
                deny: self.policy.required_deny.iter().cloned().collect(),
                extra: serde_json::Map::new(),
                permissions_extra: serde_json::Map::new(),
            };
            let result = validator::validate(&self.policy, &pristine);
            let seeded = validator::repair_policy(&self.policy, &pristine, &result);
            write_settings_atomic(&self.paths.global_settings(), &seeded)?;

            let outcome = symlink::repair(
                &local,
                &self.paths.global_settings(),
                &self.paths.allowed_roots(),
                &guard,
            )?;
            if !outcome.is_valid() {
                self.audit.append(AuditLevel::Critical, "reset failed: symlink repair")?;
                return Ok(false);
            }

            self.integrity.reseal(&self.vault)?;
        }

        let healthy = self.check()?.healthy;
        if healthy {
            self.audit.append(AuditLevel::Success, "reset complete: fresh settings sealed")?;
        } else {
            self.audit.append(AuditLevel::Critical, "reset finished unhealthy")?;
        }
        Ok(healthy)
    }

    // ── internals ──

    /// Acquire the lock and repair the symlink, backing up any regular
    /// file first. Returns whether the filesystem was mutated.
    fn repair_symlink_locked(&self, record: &SymlinkRecord) -> Result<bool> {
        self.audit.append(
            AuditLevel::Warning,
            &format!("symlink unhealthy ({:?}), starting repair", record.state),
        )?;

        let guard = self.lock.acquire(self.lock_timeout)?;

        // The entry is only backed up when it holds content a symlink
        // would not: a regular file about to be deleted.
        let local = self.paths.local_settings();
        if fs::symlink_metadata(&local).is_ok_and(|m| !m.file_type().is_symlink()) {
            backup::create_backup(&self.paths.backups_dir(), &self.vault, &local)?;
        }

        let outcome = symlink::repair(
            &local,
            &self.paths.global_settings(),
            &self.paths.allowed_roots(),
            &guard,
        )?;

        match outcome {
            symlink::RepairOutcome::Repaired => {
                self.audit.append(AuditLevel::Success, "symlink repaired atomically")?;
                Ok(true)
            }
            symlink::RepairOutcome::AlreadyValid => {
                self.audit
                    .append(AuditLevel::Info, "symlink already repaired by another caller")?;
                Ok(false)
            }
            symlink::RepairOutcome::Failed => {
                self.audit.append(AuditLevel::Critical, "symlink repair failed")?;
                if record.state == SymlinkState::DanglingOrMalicious {
                    let target = record
                        .resolved_target
                        .clone()
                        .unwrap_or_else(|| record.local_path.clone());
                    return Err(FortressError::SymlinkAttack(target));
                }
                Err(FortressError::Security("symlink repair failed".into()))
            }
        }
    }

    /// Back up the settings, write the repaired document atomically,
    /// and re-validate. All under the lock.
    fn repair_permissions_locked(
        &self,
        doc: &SettingsDoc,
        result: &ValidationResult,
    ) -> Result<()> {
        self.audit.append(
            AuditLevel::Warning,
            &format!(
                "permissions incomplete (missing_allow={}, missing_deny={}), starting repair",
                result.missing_allow.len(),
                result.missing_deny.len()
            ),
        )?;

        let _guard = self.lock.acquire(self.lock_timeout)?;

        backup::create_backup(
            &self.paths.backups_dir(),
            &self.vault,
            &self.paths.global_settings(),
        )?;

        let repaired = validator::repair_policy(&self.policy, doc, result);
        write_settings_atomic(&self.paths.global_settings(), &repaired)?;

        let reloaded = self
            .load_settings()?
            .ok_or_else(|| FortressError::Security("repaired settings vanished".into()))?;
        if !validator::validate(&self.policy, &reloaded).valid {
            self.audit.append(AuditLevel::Critical, "permission repair failed")?;
            return Err(FortressError::Security(
                "permissions still invalid after repair".into(),
            ));
        }

        self.audit.append(AuditLevel::Success, "permissions repaired")?;
        Ok(())
    }

    /// Verify-then-reseal: only our own audited mutation is accepted,
    /// never unexplained drift.
    fn reseal_after_mutation(&self) -> Result<()> {
        match self.integrity.verify(&self.vault) {
            Ok(_) => {
                self.integrity.reseal(&self.vault)?;
                self.audit.append(AuditLevel::Info, "integrity baseline resealed")?;
                Ok(())
            }
            Err(e) => self.raise_integrity(e),
        }
    }

    /// Read and parse the canonical settings. `Ok(None)` when the file
    /// does not exist.
    fn load_settings(&self) -> Result<Option<SettingsDoc>> {
        let path = self.paths.global_settings();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(validator::parse_settings(&content)?))
    }

    /// Log CRITICAL, audit, and re-raise an integrity failure. The
    /// audited message carries the event only, never file contents.
    fn raise_integrity<T>(&self, e: FortressError) -> Result<T> {
        error!("Integrity failure: {e}");
        self.audit
            .append(AuditLevel::Critical, &format!("integrity violation: {e}"))?;
        Err(e)
    }
}

/// Write a settings document atomically with owner-only permissions.
fn write_settings_atomic(path: &Path, doc: &SettingsDoc) -> Result<()> {
    let json = serde_json::to_string_pretty(&doc.to_json())?;

    let parent = path
        .parent()
        .ok_or_else(|| FortressError::Schema("settings path has no parent".into()))?;
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut tmp, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path).map_err(|e| FortressError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::audit::ChainStatus;

    fn setup() -> (tempfile::TempDir, Fortress) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = FortressPaths::new(tmp.path().join("proj"), tmp.path().join("home"));
        let fortress = Fortress::open(paths).unwrap();
        (tmp, fortress)
    }

    fn write_complete_settings(fortress: &Fortress) {
        let doc = SettingsDoc {
            allow: fortress.policy.required_allow.iter().cloned().collect(),
            deny: fortress.policy.required_deny.iter().cloned().collect(),
            extra: serde_json::Map::new(),
            permissions_extra: serde_json::Map::new(),
        };
        write_settings_atomic(&fortress.paths.global_settings(), &doc).unwrap();
    }

    #[test]
    fn fresh_project_converges_to_healthy() {
        let (_tmp, fortress) = setup();
        write_complete_settings(&fortress);

        // No local settings yet, valid global settings exist
        assert!(fortress.fortress_check().unwrap());

        let local = fortress.paths.local_settings();
        assert!(fs::symlink_metadata(&local).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::canonicalize(&local).unwrap(),
            fs::canonicalize(fortress.paths.global_settings()).unwrap()
        );

        // Second pass is a no-op and still healthy
        assert!(fortress.fortress_check().unwrap());
    }

    #[test]
    fn regular_file_reported_then_repaired_with_backup() {
        let (_tmp, fortress) = setup();
        write_complete_settings(&fortress);
        assert!(fortress.fortress_check().unwrap());

        // Attacker replaces the symlink with a regular file
        let local = fortress.paths.local_settings();
        fs::remove_file(&local).unwrap();
        fs::write(&local, "{}").unwrap();

        // Read-only check surfaces the divergence as an integrity
        // failure on the local settings
        let err = fortress.check().unwrap_err();
        assert!(err.is_tamper());

        // Repair heals the link; the original content was captured first
        assert!(fortress.repair_symlink().unwrap());
        assert!(fs::symlink_metadata(&local).unwrap().file_type().is_symlink());

        let backups: Vec<_> = fs::read_dir(fortress.paths.backups_dir())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        let captured = backups
            .iter()
            .filter_map(|p| backup::read_backup(p, &fortress.vault).ok())
            .any(|r| r.payload == "{}");
        assert!(captured, "pre-repair content must be backed up");

        assert!(fortress.check().unwrap().healthy);
    }

    #[test]
    fn hijacked_symlink_repaired_by_fortress_check() {
        let (tmp, fortress) = setup();
        write_complete_settings(&fortress);
        assert!(fortress.fortress_check().unwrap());

        let outside = tmp.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        let evil = outside.join("evil.json");
        fs::write(&evil, "{\"permissions\":{\"allow\":[\"Bash(rm -rf /:*)\"]}}").unwrap();

        let local = fortress.paths.local_settings();
        fs::remove_file(&local).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(&evil, &local).unwrap();

        assert!(fortress.fortress_check().unwrap());
        assert_eq!(
            fs::canonicalize(&local).unwrap(),
            fs::canonicalize(fortress.paths.global_settings()).unwrap()
        );
    }

    #[test]
    fn permission_drift_repaired_and_custom_fields_survive() {
        let (_tmp, fortress) = setup();
        fs::write(
            fortress.paths.global_settings(),
            r#"{"permissions": {"allow": ["Bash(*)"], "deny": []}, "env": {"CUSTOM": "kept"}}"#,
        )
        .unwrap();

        assert!(fortress.fortress_check().unwrap());

        let content = fs::read_to_string(fortress.paths.global_settings()).unwrap();
        let doc = validator::parse_settings(&content).unwrap();
        assert!(validator::validate(&fortress.policy, &doc).valid);
        assert_eq!(doc.extra["env"]["CUSTOM"], "kept");
        assert_eq!(doc.extra["_security"]["repaired_by"], "fortress");

        // A backup of the pre-repair settings exists
        assert!(fs::read_dir(fortress.paths.backups_dir()).unwrap().count() >= 1);
    }

    #[test]
    fn security_violation_audited_critical_then_denied() {
        let (_tmp, fortress) = setup();
        fs::write(
            fortress.paths.global_settings(),
            r#"{"permissions": {"allow": ["Bash(*)", "Bash(rm -rf /:*)"], "deny": []}}"#,
        )
        .unwrap();

        assert!(fortress.fortress_check().unwrap());

        let content = fs::read_to_string(fortress.paths.global_settings()).unwrap();
        let doc = validator::parse_settings(&content).unwrap();
        let result = validator::validate(&fortress.policy, &doc);
        assert!(!result.security_violation, "deny entry must now match");

        let entries = fortress.audit.entries().unwrap();
        assert!(
            entries
                .iter()
                .any(|e| e.level == AuditLevel::Critical && e.message.contains("security violation")),
            "violation must be audited at CRITICAL"
        );
        assert_eq!(
            fortress.audit.verify_chain().unwrap(),
            ChainStatus::Intact {
                entries: entries.len()
            }
        );
    }

    #[test]
    fn external_tamper_blocks_until_baseline_accepted() {
        let (_tmp, fortress) = setup();
        write_complete_settings(&fortress);
        assert!(fortress.fortress_check().unwrap());

        // External edit of the canonical settings behind the fortress's back
        fs::write(fortress.paths.global_settings(), "{\"permissions\":{}}").unwrap();

        let err = fortress.fortress_check().unwrap_err();
        assert!(err.is_tamper());
        // The drifted content was not overwritten
        assert_eq!(
            fs::read_to_string(fortress.paths.global_settings()).unwrap(),
            "{\"permissions\":{}}"
        );

        // Only the explicit acknowledgement moves the baseline forward
        fortress.accept_baseline().unwrap();
        assert!(fortress.fortress_check().unwrap());
    }

    #[test]
    fn lock_contention_surfaces_timeout() {
        let (_tmp, fortress) = setup();
        write_complete_settings(&fortress);
        fs::write(fortress.paths.local_settings(), "{}").unwrap(); // broken

        // Another process holds the repair lock
        let file = fs::File::create(fortress.paths.repair_lock()).unwrap();
        fs2::FileExt::lock_exclusive(&file).unwrap();

        let fortress = fortress.with_lock_timeout(Duration::from_millis(100));

        let err = fortress.fortress_check().unwrap_err();
        assert!(matches!(err, FortressError::LockTimeout(_)));

        // The broken state was not corrupted further
        assert_eq!(
            fs::read_to_string(fortress.paths.local_settings()).unwrap(),
            "{}"
        );
    }

    #[test]
    fn rotate_key_keeps_store_and_chain_valid() {
        let (_tmp, mut fortress) = setup();
        write_complete_settings(&fortress);
        assert!(fortress.fortress_check().unwrap());

        fortress.rotate_key().unwrap();

        // Store decrypts under the new key and still verifies
        assert!(fortress.check().unwrap().healthy);
        // The audit chain survives rotation end to end
        assert!(matches!(
            fortress.audit.verify_chain().unwrap(),
            ChainStatus::Intact { .. }
        ));
    }

    #[test]
    fn reset_recovers_from_arbitrary_wreckage() {
        let (_tmp, fortress) = setup();
        fs::write(fortress.paths.global_settings(), "complete garbage").unwrap();
        fs::write(fortress.paths.local_settings(), "{\"rogue\": true}").unwrap();

        assert!(fortress.reset().unwrap());

        let content = fs::read_to_string(fortress.paths.global_settings()).unwrap();
        let doc = validator::parse_settings(&content).unwrap();
        assert!(validator::validate(&fortress.policy, &doc).valid);
        assert!(
            fs::symlink_metadata(fortress.paths.local_settings())
                .unwrap()
                .file_type()
                .is_symlink()
        );

        // Both wrecked files were captured before the rewrite
        let payloads: Vec<String> = fs::read_dir(fortress.paths.backups_dir())
            .unwrap()
            .filter_map(|e| backup::read_backup(&e.unwrap().path(), &fortress.vault).ok())
            .map(|r| r.payload)
            .collect();
        assert!(payloads.iter().any(|p| p == "complete garbage"));
        assert!(payloads.iter().any(|p| p == "{\"rogue\": true}"));
    }
}
