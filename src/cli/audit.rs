//! CLI subcommands: `fortress audit` and `fortress status`.

use anyhow::Result;
use clap::Args;

use crate::security::{ChainStatus, Fortress, KeySource, SymlinkState};

#[derive(Args)]
pub struct AuditArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Filter by level (e.g. WARNING, CRITICAL)
    #[arg(long)]
    pub level: Option<String>,
}

pub fn show(fortress: &Fortress, args: AuditArgs) -> Result<u8> {
    // Chain verification runs on the full log, before any filtering
    let chain = fortress.audit().verify_chain()?;

    let mut entries = fortress.audit().entries().unwrap_or_default();
    if let Some(ref level) = args.level {
        let wanted = level.to_uppercase();
        entries.retain(|e| e.level.as_str() == wanted);
    }

    if args.json {
        let items: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "seq": e.seq,
                    "timestamp": e.timestamp,
                    "level": e.level.as_str(),
                    "message": e.message,
                    "mac": e.mac,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if entries.is_empty() {
        println!("No audit log entries.");
    } else {
        println!("Security Audit Log ({} entries):", entries.len());
        println!();
        for e in &entries {
            println!(
                "  [{}] {:<8} {} (mac: {})",
                e.timestamp,
                e.level.as_str(),
                e.message,
                &e.mac[..16]
            );
        }
    }

    match chain {
        ChainStatus::Intact { entries } => {
            println!();
            println!("Chain: INTACT ({entries} entries)");
            Ok(0)
        }
        ChainStatus::TamperedAt(index) => {
            println!();
            println!("Chain: TAMPERED at entry {index}");
            Ok(2)
        }
    }
}

pub fn status(fortress: &Fortress) -> Result<u8> {
    let paths = fortress.paths();
    println!("Project: {}", paths.project_root.display());
    println!("Global settings: {}", paths.global_settings().display());

    let record = fortress.symlink_record();
    println!("Symlink: {:?}", record.state);
    if let Some(target) = &record.resolved_target {
        println!("  resolves to {}", target.display());
    }

    match fortress.check() {
        Ok(report) => println!("Integrity: {:?}", report.integrity),
        Err(e) => println!("Integrity: FAILED ({e})"),
    }

    match fortress.audit().verify_chain()? {
        ChainStatus::Intact { entries } => println!("Audit chain: intact ({entries} entries)"),
        ChainStatus::TamperedAt(index) => println!("Audit chain: TAMPERED at entry {index}"),
    }

    let key_source = match fortress.vault().source() {
        KeySource::Environment => "environment (FORTRESS_MASTER_KEY)",
        KeySource::PersistedFile => "persisted key file",
    };
    println!("Vault key: {key_source}");

    let backups = std::fs::read_dir(paths.backups_dir())
        .map(|d| d.count())
        .unwrap_or(0);
    println!("Backups: {backups}");

    Ok(u8::from(record.state != SymlinkState::Valid))
}
