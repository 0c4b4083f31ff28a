//! Permission policy validation for settings documents.
//!
//! A settings document carries `permissions.allow` and
//! `permissions.deny` capability lists. Validation checks them against
//! the fixed [`PermissionPolicy`]: every required grant present, every
//! required deny present, and no dangerous grant allowed without its
//! matching deny. Malformed shapes (a bare string where a list belongs)
//! are a schema violation, not a crash and not a silent false.
//!
//! `validate` never mutates its input; `repair_policy` is a separate
//! pure function producing a corrected document.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::warn;

use crate::error::{FortressError, Result};

/// Grants that must always be present in the allow list.
const REQUIRED_ALLOW: &[&str] = &[
    "Bash(*)",
    "Read(*)",
    "Edit(*)",
    "Write(*)",
    "MultiEdit(*)",
    "Glob(*)",
    "Grep(*)",
    "LS(*)",
    "Task(*)",
    "WebFetch(*)",
    "WebSearch(*)",
    "TodoRead(*)",
    "TodoWrite(*)",
    "NotebookRead(*)",
    "NotebookEdit(*)",
    "exit_plan_mode(*)",
    "mcp__ide__getDiagnostics(*)",
    "mcp__ide__executeCode(*)",
    "mcp__*",
];

/// Destructive grants that must always be present in the deny list.
/// An allow entry matching one of these without the corresponding deny
/// is a security violation.
const REQUIRED_DENY: &[&str] = &[
    "Bash(rm -rf /:*)",
    "Bash(sudo su:*)",
    "Bash(dd:*)",
    "Bash(mkfs:*)",
];

/// Defaults seeded into a repaired document when the caller never set
/// them.
const DEFAULT_ENV: (&str, &str) = ("CLAUDE_CODE_ENABLE_TELEMETRY", "1");
const DEFAULT_MODEL: &str = "opus";

/// The fixed security policy baked into the fortress.
#[derive(Debug, Clone)]
pub struct PermissionPolicy {
    pub required_allow: BTreeSet<String>,
    pub required_deny: BTreeSet<String>,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self {
            required_allow: REQUIRED_ALLOW.iter().map(|s| s.to_string()).collect(),
            required_deny: REQUIRED_DENY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parsed settings document. `extra` and `permissions_extra` carry every
/// caller-added field verbatim so a repair never drops custom state.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDoc {
    pub allow: Vec<String>,
    pub deny: Vec<String>,
    /// Top-level keys other than `permissions`.
    pub extra: Map<String, Value>,
    /// Keys inside `permissions` other than `allow`/`deny`.
    pub permissions_extra: Map<String, Value>,
}

impl SettingsDoc {
    /// Render back to a JSON value with the same shape the file uses.
    pub fn to_json(&self) -> Value {
        let mut permissions = Map::new();
        permissions.insert("allow".into(), self.allow.clone().into());
        permissions.insert("deny".into(), self.deny.clone().into());
        for (k, v) in &self.permissions_extra {
            permissions.insert(k.clone(), v.clone());
        }

        let mut root = Map::new();
        root.insert("permissions".into(), Value::Object(permissions));
        for (k, v) in &self.extra {
            root.insert(k.clone(), v.clone());
        }
        Value::Object(root)
    }
}

/// Result of validating one settings document. Pure output; nothing is
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub security_violation: bool,
    pub missing_allow: BTreeSet<String>,
    pub missing_deny: BTreeSet<String>,
    pub dangerous_entries: BTreeSet<String>,
}

/// Parse settings JSON into the typed document.
///
/// Any shape surprise — non-object root, `permissions` that is not an
/// object, a list field that is a bare string, a non-string list
/// element — is [`FortressError::Schema`].
pub fn parse_settings(content: &str) -> Result<SettingsDoc> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| FortressError::Schema(format!("settings are not valid JSON: {e}")))?;

    let Value::Object(mut root) = value else {
        return Err(FortressError::Schema(
            "settings root must be an object".into(),
        ));
    };

    let (allow, deny, permissions_extra) = match root.remove("permissions") {
        None => (Vec::new(), Vec::new(), Map::new()),
        Some(Value::Object(mut perms)) => {
            let allow = take_string_list(&mut perms, "allow")?;
            let deny = take_string_list(&mut perms, "deny")?;
            (allow, deny, perms)
        }
        Some(_) => {
            return Err(FortressError::Schema(
                "permissions must be an object".into(),
            ));
        }
    };

    Ok(SettingsDoc {
        allow,
        deny,
        extra: root,
        permissions_extra,
    })
}

fn take_string_list(perms: &mut Map<String, Value>, key: &str) -> Result<Vec<String>> {
    match perms.remove(key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(FortressError::Schema(format!(
                    "permissions.{key} entries must be strings, found {other}"
                ))),
            })
            .collect(),
        Some(other) => Err(FortressError::Schema(format!(
            "permissions.{key} must be a list, found {other}"
        ))),
    }
}

/// Check a document's capability lists against the policy.
pub fn validate(policy: &PermissionPolicy, doc: &SettingsDoc) -> ValidationResult {
    let allow: BTreeSet<&str> = doc.allow.iter().map(String::as_str).collect();
    let deny: BTreeSet<&str> = doc.deny.iter().map(String::as_str).collect();

    let missing_allow: BTreeSet<String> = policy
        .required_allow
        .iter()
        .filter(|p| !allow.contains(p.as_str()))
        .cloned()
        .collect();
    let missing_deny: BTreeSet<String> = policy
        .required_deny
        .iter()
        .filter(|p| !deny.contains(p.as_str()))
        .cloned()
        .collect();

    // A dangerous grant is only a violation while its deny is absent —
    // the deny list wins when both entries are present.
    let dangerous_entries: BTreeSet<String> = policy
        .required_deny
        .iter()
        .filter(|p| allow.contains(p.as_str()) && !deny.contains(p.as_str()))
        .cloned()
        .collect();

    let security_violation = !dangerous_entries.is_empty();
    if security_violation {
        warn!("Dangerous grants allowed without deny: {:?}", dangerous_entries);
    }

    ValidationResult {
        valid: missing_allow.is_empty() && missing_deny.is_empty() && !security_violation,
        security_violation,
        missing_allow,
        missing_deny,
        dangerous_entries,
    }
}

/// Produce a corrected document: required entries merged in, every
/// caller-added field preserved, and a `_security` block recording when
/// and why the repair happened. The input is untouched.
pub fn repair_policy(
    policy: &PermissionPolicy,
    doc: &SettingsDoc,
    result: &ValidationResult,
) -> SettingsDoc {
    let allow: BTreeSet<String> = doc
        .allow
        .iter()
        .cloned()
        .chain(policy.required_allow.iter().cloned())
        .collect();
    let deny: BTreeSet<String> = doc
        .deny
        .iter()
        .cloned()
        .chain(policy.required_deny.iter().cloned())
        .collect();

    let mut extra = doc.extra.clone();
    if !extra.contains_key("env") {
        let mut env = Map::new();
        env.insert(DEFAULT_ENV.0.into(), DEFAULT_ENV.1.into());
        extra.insert("env".into(), Value::Object(env));
    }
    if !extra.contains_key("model") {
        extra.insert("model".into(), DEFAULT_MODEL.into());
    }

    let mut security = Map::new();
    security.insert(
        "repaired_at".into(),
        chrono::Utc::now().timestamp().into(),
    );
    security.insert("repaired_by".into(), "fortress".into());
    security.insert(
        "reason".into(),
        format!(
            "missing_allow={} missing_deny={} dangerous={}",
            result.missing_allow.len(),
            result.missing_deny.len(),
            result.dangerous_entries.len()
        )
        .into(),
    );
    extra.insert("_security".into(), Value::Object(security));

    SettingsDoc {
        allow: allow.into_iter().collect(),
        deny: deny.into_iter().collect(),
        extra,
        permissions_extra: doc.permissions_extra.clone(),
    }
}

/// Warn about loose modes and foreign ownership on a protected file.
///
/// Returns `false` only when the file is missing. A world-readable file
/// still passes — the warning is logged but the check succeeds.
pub fn check_file_security(path: &Path) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let mode = meta.mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                "Overly permissive mode on {}: {:o}",
                path.display(),
                mode
            );
        }
        let uid = unsafe { libc::getuid() };
        if meta.uid() != uid {
            warn!("File not owned by current user: {}", path.display());
        }
    }

    #[cfg(not(unix))]
    let _ = meta;

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_doc(policy: &PermissionPolicy) -> SettingsDoc {
        SettingsDoc {
            allow: policy.required_allow.iter().cloned().collect(),
            deny: policy.required_deny.iter().cloned().collect(),
            extra: Map::new(),
            permissions_extra: Map::new(),
        }
    }

    #[test]
    fn complete_document_is_valid() {
        let policy = PermissionPolicy::default();
        let result = validate(&policy, &complete_doc(&policy));

        assert!(result.valid);
        assert!(!result.security_violation);
        assert!(result.missing_allow.is_empty());
        assert!(result.missing_deny.is_empty());
    }

    #[test]
    fn missing_entries_reported() {
        let policy = PermissionPolicy::default();
        let doc = parse_settings(r#"{"permissions": {"allow": ["Bash(*)"], "deny": []}}"#).unwrap();

        let result = validate(&policy, &doc);
        assert!(!result.valid);
        assert!(result.missing_allow.contains("Read(*)"));
        assert!(result.missing_deny.contains("Bash(rm -rf /:*)"));
        assert!(!result.security_violation);
    }

    #[test]
    fn dangerous_allow_without_deny_is_violation() {
        let policy = PermissionPolicy::default();
        let doc = parse_settings(
            r#"{"permissions": {"allow": ["Bash(*)", "Bash(rm -rf /:*)"], "deny": []}}"#,
        )
        .unwrap();

        let result = validate(&policy, &doc);
        assert!(result.security_violation);
        assert!(result.dangerous_entries.contains("Bash(rm -rf /:*)"));
        assert!(!result.valid);
    }

    #[test]
    fn matching_deny_clears_violation() {
        let policy = PermissionPolicy::default();
        let doc = parse_settings(
            r#"{"permissions": {
                "allow": ["Bash(*)", "Bash(rm -rf /:*)"],
                "deny": ["Bash(rm -rf /:*)"]
            }}"#,
        )
        .unwrap();

        let result = validate(&policy, &doc);
        assert!(!result.security_violation);
        assert!(result.dangerous_entries.is_empty());
    }

    #[test]
    fn bare_string_allow_is_schema_violation() {
        let err = parse_settings(r#"{"permissions": {"allow": "Bash(*)", "deny": []}}"#)
            .unwrap_err();
        assert!(matches!(err, FortressError::Schema(_)));
    }

    #[test]
    fn non_string_entry_is_schema_violation() {
        let err =
            parse_settings(r#"{"permissions": {"allow": [42], "deny": []}}"#).unwrap_err();
        assert!(matches!(err, FortressError::Schema(_)));
    }

    #[test]
    fn invalid_json_is_schema_violation_not_crash() {
        assert!(matches!(
            parse_settings("not json at all"),
            Err(FortressError::Schema(_))
        ));
        assert!(matches!(
            parse_settings(r#"["a", "list"]"#),
            Err(FortressError::Schema(_))
        ));
        assert!(matches!(
            parse_settings(r#"{"permissions": "none"}"#),
            Err(FortressError::Schema(_))
        ));
    }

    #[test]
    fn missing_permissions_block_means_empty_lists() {
        let doc = parse_settings(r#"{"model": "opus"}"#).unwrap();
        assert!(doc.allow.is_empty());
        assert!(doc.deny.is_empty());
        assert_eq!(doc.extra["model"], "opus");
    }

    #[test]
    fn repair_merges_and_preserves_custom_fields() {
        let policy = PermissionPolicy::default();
        let doc = parse_settings(
            r#"{
                "permissions": {"allow": ["Bash(*)", "CustomTool(*)"], "deny": []},
                "env": {"CUSTOM": "value"}
            }"#,
        )
        .unwrap();
        let result = validate(&policy, &doc);

        let repaired = repair_policy(&policy, &doc, &result);

        let allow: BTreeSet<&str> = repaired.allow.iter().map(String::as_str).collect();
        assert!(policy.required_allow.iter().all(|p| allow.contains(p.as_str())));
        assert!(allow.contains("CustomTool(*)"));
        let deny: BTreeSet<&str> = repaired.deny.iter().map(String::as_str).collect();
        assert!(policy.required_deny.iter().all(|p| deny.contains(p.as_str())));

        assert_eq!(repaired.extra["env"]["CUSTOM"], "value");
        assert_eq!(repaired.extra["_security"]["repaired_by"], "fortress");

        // Re-validation of the repaired document passes
        assert!(validate(&policy, &repaired).valid);
        // The input document was not mutated
        assert_eq!(doc.allow, vec!["Bash(*)", "CustomTool(*)"]);
        assert!(!doc.extra.contains_key("_security"));
    }

    #[test]
    fn repair_seeds_defaults_when_absent() {
        let policy = PermissionPolicy::default();
        let doc = parse_settings(r#"{"permissions": {"allow": [], "deny": []}}"#).unwrap();
        let result = validate(&policy, &doc);

        let repaired = repair_policy(&policy, &doc, &result);
        assert_eq!(repaired.extra["env"][DEFAULT_ENV.0], DEFAULT_ENV.1);
        assert_eq!(repaired.extra["model"], DEFAULT_MODEL);
    }

    #[test]
    fn to_json_roundtrips() {
        let doc = parse_settings(
            r#"{
                "permissions": {"allow": ["Bash(*)"], "deny": ["Bash(dd:*)"], "ask": ["Fetch(*)"]},
                "model": "opus"
            }"#,
        )
        .unwrap();

        let rendered = doc.to_json().to_string();
        let reparsed = parse_settings(&rendered).unwrap();
        assert_eq!(doc, reparsed);
        assert_eq!(reparsed.permissions_extra["ask"][0], "Fetch(*)");
    }

    #[test]
    fn world_readable_file_still_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("settings.json");
        std::fs::write(&file, "{}").unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&file, std::fs::Permissions::from_mode(0o644)).unwrap();
        }

        // Lenient per long-standing behavior: warn, do not fail
        assert!(check_file_security(&file));
        assert!(!check_file_security(&tmp.path().join("missing.json")));
    }
}
