pub mod audit;
pub mod check;
pub mod keys;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::paths::FortressPaths;
use crate::security::Fortress;

#[derive(Parser)]
#[command(name = "fortress")]
#[command(author, version, about = "Integrity protection for Claude Code permission settings")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root to guard (default: current directory)
    #[arg(short, long, global = true, env = "FORTRESS_PROJECT_ROOT")]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Verify symlink, integrity store, and permissions (read-only)
    Verify,

    /// Repair the local settings symlink
    Repair,

    /// Verify, then repair anything unhealthy
    Check,

    /// Re-encrypt the integrity store and backups under a new key
    RotateKey,

    /// Adopt the current on-disk state as the new integrity baseline
    AcceptBaseline,

    /// Show the audit log and verify its chain
    Audit(audit::AuditArgs),

    /// Show current security posture
    Status,

    /// Poll and auto-repair on an interval
    Monitor(check::MonitorArgs),

    /// Back everything up and rewrite pristine policy settings (destructive)
    Reset(keys::ResetArgs),
}

/// Dispatch a parsed command. Returns the process exit code.
pub fn run(cli: Cli) -> Result<u8> {
    let paths = match cli.project {
        Some(root) => {
            let home = etcetera::home_dir()
                .map_err(|e| anyhow::anyhow!("Failed to resolve home directory: {e}"))?;
            FortressPaths::new(root, home)
        }
        None => FortressPaths::resolve()?,
    };
    let fortress = Fortress::open(paths)?;

    match cli.command {
        Commands::Verify => check::verify(&fortress),
        Commands::Repair => check::repair(&fortress),
        Commands::Check => check::check(&fortress),
        Commands::Monitor(args) => check::monitor(&fortress, args),
        Commands::Audit(args) => audit::show(&fortress, args),
        Commands::Status => audit::status(&fortress),
        Commands::RotateKey => keys::rotate(fortress),
        Commands::AcceptBaseline => keys::accept_baseline(&fortress),
        Commands::Reset(args) => keys::reset(&fortress, args),
    }
}
