//! Cross-process repair lock using advisory file locking (fs2 flock).
//!
//! Serializes all destructive fortress operations (symlink repair,
//! settings rewrite, reseal) across processes and threads so the
//! protected files are never mutated concurrently. Acquisition is
//! bounded: callers pass a timeout and get [`FortressError::LockTimeout`]
//! back instead of blocking forever.

use fs2::FileExt;
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::{FortressError, Result};

/// Default budget for serializing one repair. Repairs themselves finish
/// in well under a second; the budget covers waiting on other holders.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between acquisition attempts while waiting.
const RETRY_INTERVAL: Duration = Duration::from_millis(25);

/// Advisory exclusive lock on `.claude/security/repair.lock`.
#[derive(Clone)]
pub struct RepairLock {
    path: PathBuf,
}

/// RAII guard that releases the lock on drop — on normal return, on
/// error, and on panic unwinding alike.
pub struct RepairLockGuard {
    file: File,
}

impl Drop for RepairLockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl RepairLock {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Acquire the lock, waiting up to `timeout`.
    ///
    /// Polls the OS lock at a short interval; every attempt is
    /// non-blocking so a crashed holder never wedges this caller past
    /// the budget. The lock file itself is created on demand.
    pub fn acquire(&self, timeout: Duration) -> Result<RepairLockGuard> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(guard) = self.try_acquire()? {
                return Ok(guard);
            }
            if Instant::now() >= deadline {
                return Err(FortressError::LockTimeout(timeout));
            }
            std::thread::sleep(RETRY_INTERVAL);
        }
    }

    /// Non-blocking try-acquire — returns `None` if another holder has it.
    pub fn try_acquire(&self) -> Result<Option<RepairLockGuard>> {
        let file = File::create(&self.path)?;
        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(RepairLockGuard { file })),
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            #[cfg(unix)]
            Err(ref e) if e.raw_os_error() == Some(35) || e.raw_os_error() == Some(11) => {
                // EAGAIN(11) / EWOULDBLOCK(35 on macOS) — lock contention
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
