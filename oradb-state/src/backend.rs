//! State backend trait and error types

use async_trait::async_trait;
use thiserror::Error;

use crate::lock::LockInfo;
use crate::state::StateFile;

/// Errors that can occur when interacting with a state backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// The state is locked by another process
    #[error("State is locked by {who} (lock ID: {lock_id}, operation: {operation})")]
    Locked {
        lock_id: String,
        who: String,
        operation: String,
    },

    /// No lock is held (for release/force-unlock operations)
    #[error("Lock not found: {0}")]
    LockNotFound(String),

    /// Lock ID mismatch when trying to release
    #[error("Lock ID mismatch: expected {expected}, got {actual}")]
    LockMismatch { expected: String, actual: String },

    /// State file is corrupted or invalid
    #[error("Invalid state file: {0}")]
    InvalidState(String),

    /// The stored state belongs to a different lineage
    #[error("State lineage mismatch: expected {expected}, got {actual}")]
    LineageMismatch { expected: String, actual: String },

    /// A write would replace a newer state
    #[error("Stale state: serial {actual} is not newer than stored serial {stored}")]
    StaleSerial { stored: u64, actual: u64 },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// Create a Locked error from a LockInfo
    pub fn locked(lock: &LockInfo) -> Self {
        Self::Locked {
            lock_id: lock.id.clone(),
            who: lock.who.clone(),
            operation: lock.operation.clone(),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Storage for the state file and its lock
#[async_trait]
pub trait StateBackend: Send + Sync {
    /// Read the current state
    ///
    /// Returns `None` if no state exists yet
    async fn read_state(&self) -> BackendResult<Option<StateFile>>;

    /// Write the state
    ///
    /// The serial must be incremented before calling this, and the lineage
    /// must match any state already stored.
    async fn write_state(&self, state: &StateFile) -> BackendResult<()>;

    /// Acquire a lock for the given operation
    ///
    /// Fails while another unexpired lock is held
    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo>;

    /// Release a previously acquired lock
    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()>;

    /// Release a lock by its ID regardless of who holds it
    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_error_names_holder() {
        let lock = LockInfo::new("apply");
        let error = BackendError::locked(&lock);

        match &error {
            BackendError::Locked {
                lock_id,
                who,
                operation,
            } => {
                assert_eq!(lock_id, &lock.id);
                assert_eq!(who, &lock.who);
                assert_eq!(operation, "apply");
            }
            _ => panic!("Expected Locked error"),
        }
        assert!(error.to_string().contains(&lock.who));
    }

    #[test]
    fn stale_serial_display() {
        let error = BackendError::StaleSerial {
            stored: 4,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Stale state: serial 3 is not newer than stored serial 4"
        );
    }
}
