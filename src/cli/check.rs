//! CLI subcommands: `fortress verify`, `repair`, `check`, `monitor`.
//!
//! Exit codes: `verify` returns 0 healthy / 1 unhealthy / 2 tamper
//! detected; `repair` and `check` return 0 on a healthy postcondition
//! and 1 otherwise (2 again for tamper).

use anyhow::Result;
use clap::Args;
use std::time::Duration;

use crate::security::{Fortress, SymlinkState};

#[derive(Args)]
pub struct MonitorArgs {
    /// Seconds between health checks
    #[arg(short, long, default_value_t = 5)]
    pub interval: u64,
}

pub fn verify(fortress: &Fortress) -> Result<u8> {
    match fortress.check() {
        Ok(report) => {
            println!("Symlink: {:?}", report.symlink.state);
            println!("Integrity: {:?}", report.integrity);
            match &report.validation {
                Some(v) if v.valid => println!("Permissions: valid"),
                Some(v) => println!(
                    "Permissions: invalid (missing allow: {}, missing deny: {}, dangerous: {})",
                    v.missing_allow.len(),
                    v.missing_deny.len(),
                    v.dangerous_entries.len()
                ),
                None => println!("Permissions: unreadable"),
            }

            if report.healthy {
                println!("Fortress: HEALTHY");
                Ok(0)
            } else {
                println!("Fortress: UNHEALTHY");
                Ok(1)
            }
        }
        Err(e) if e.is_tamper() => {
            println!("Fortress: TAMPER DETECTED");
            println!("  {e}");
            println!("  Run `fortress accept-baseline` only after investigating.");
            Ok(2)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn repair(fortress: &Fortress) -> Result<u8> {
    if fortress.repair_symlink()? {
        println!("Symlink: VALID");
        Ok(0)
    } else {
        println!("Symlink repair FAILED");
        Ok(1)
    }
}

pub fn check(fortress: &Fortress) -> Result<u8> {
    match fortress.fortress_check() {
        Ok(true) => {
            println!("Fortress: SECURE");
            Ok(0)
        }
        Ok(false) => {
            println!("Fortress: issues remain after repair");
            Ok(1)
        }
        Err(e) if e.is_tamper() => {
            println!("Fortress: TAMPER DETECTED");
            println!("  {e}");
            Ok(2)
        }
        Err(e) => Err(e.into()),
    }
}

/// Continuous polling with auto-repair. Quick symlink check every tick,
/// full fortress check every 10th, stats every 100th. This is a
/// caller-driven cadence, not a filesystem watcher.
pub fn monitor(fortress: &Fortress, args: MonitorArgs) -> Result<u8> {
    let interval = Duration::from_secs(args.interval.max(1));
    println!("Monitoring every {}s. Press Ctrl+C to stop.", interval.as_secs());

    let mut checks: u64 = 0;
    let mut repairs: u64 = 0;

    loop {
        checks += 1;

        if fortress.symlink_record().state != SymlinkState::Valid {
            tracing::warn!("Quick repair needed (check #{checks})");
            match fortress.fortress_check() {
                Ok(true) => repairs += 1,
                Ok(false) => tracing::error!("Repair left the fortress unhealthy"),
                Err(e) => tracing::error!("Repair failed: {e}"),
            }
        } else if checks % 10 == 0
            && let Err(e) = fortress.fortress_check()
        {
            tracing::error!("Periodic check failed: {e}");
        }

        if checks % 100 == 0 {
            println!("Monitor stats: {checks} checks, {repairs} repairs");
        }

        std::thread::sleep(interval);
    }
}
