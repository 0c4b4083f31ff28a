pub mod repair_lock;

pub use repair_lock::{RepairLock, RepairLockGuard, DEFAULT_LOCK_TIMEOUT};
