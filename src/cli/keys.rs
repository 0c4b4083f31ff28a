//! CLI subcommands: `fortress rotate-key`, `accept-baseline`, `reset`.

use anyhow::Result;
use clap::Args;

use crate::security::Fortress;

#[derive(Args)]
pub struct ResetArgs {
    /// Confirm the destructive reset
    #[arg(long)]
    pub yes: bool,
}

pub fn rotate(mut fortress: Fortress) -> Result<u8> {
    fortress.rotate_key()?;
    println!("Key rotated. Integrity store and backups re-encrypted.");
    Ok(0)
}

pub fn accept_baseline(fortress: &Fortress) -> Result<u8> {
    fortress.accept_baseline()?;
    println!("Baseline accepted: current on-disk state is now sealed.");
    Ok(0)
}

pub fn reset(fortress: &Fortress, args: ResetArgs) -> Result<u8> {
    if !args.yes {
        anyhow::bail!("reset rewrites all settings; re-run with --yes to confirm");
    }

    if fortress.reset()? {
        println!("Reset complete. Fresh policy settings sealed.");
        Ok(0)
    } else {
        println!("Reset FAILED. Manual intervention required.");
        Ok(1)
    }
}
