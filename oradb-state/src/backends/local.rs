//! Local file backend for state storage
//!
//! Stores state in a local JSON file (default: oradb.state.json) next to a
//! `.lock` file holding the current [`LockInfo`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::backend::{BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

/// State kept in the local filesystem
pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "oradb.state.json";

    /// Backend using oradb.state.json in the current directory
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(Self::DEFAULT_STATE_FILE))
    }

    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        let content = match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read lock file: {}", e))),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| BackendError::InvalidState(format!("Failed to parse lock file: {}", e)))
    }

    async fn remove_lock(&self) -> BackendResult<()> {
        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to remove lock file: {}", e)))
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::Io(format!("Failed to read state file: {}", e))),
        };

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!("Failed to parse state file: {}", e))
        })?;
        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(stored) = self.read_state().await? {
            if stored.lineage != state.lineage {
                return Err(BackendError::LineageMismatch {
                    expected: stored.lineage,
                    actual: state.lineage.clone(),
                });
            }
            if state.serial <= stored.serial {
                return Err(BackendError::StaleSerial {
                    stored: stored.serial,
                    actual: state.serial,
                });
            }
        }

        let content = serde_json::to_string_pretty(state).map_err(|e| {
            BackendError::Serialization(format!("Failed to serialize state: {}", e))
        })?;

        // Write beside the target, then rename over it
        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write state file: {}", e)))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to replace state file: {}", e)))?;

        log::debug!(
            "wrote {} (serial {})",
            self.state_path.display(),
            state.serial
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        match self.read_lock().await {
            Ok(Some(existing)) if !existing.is_expired() => {
                return Err(BackendError::locked(&existing));
            }
            Ok(Some(existing)) => {
                log::warn!(
                    "taking over expired lock {} held by {}",
                    existing.id,
                    existing.who
                );
            }
            Ok(None) => {}
            // An unreadable lock file is treated as stale
            Err(e) => log::warn!("ignoring lock file: {}", e),
        }

        let lock = LockInfo::new(operation);
        let content = serde_json::to_string_pretty(&lock)
            .map_err(|e| BackendError::Serialization(format!("Failed to serialize lock: {}", e)))?;
        tokio::fs::write(&self.lock_path, content)
            .await
            .map_err(|e| BackendError::Io(format!("Failed to write lock file: {}", e)))?;

        Ok(lock)
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock.id.clone()))?;

        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        if !self.lock_path.exists() {
            return Err(BackendError::LockNotFound(lock_id.to_string()));
        }

        if let Ok(Some(existing)) = self.read_lock().await
            && existing.id != lock_id
        {
            return Err(BackendError::LockMismatch {
                expected: lock_id.to_string(),
                actual: existing.id,
            });
        }
        self.remove_lock().await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::state::ResourceState;

    fn backend(dir: &tempfile::TempDir) -> LocalBackend {
        LocalBackend::with_path(dir.path().join("test.state.json"))
    }

    #[test]
    fn default_paths() {
        let backend = LocalBackend::new();
        assert_eq!(backend.state_path(), Path::new("oradb.state.json"));
        assert_eq!(backend.lock_path(), Path::new("oradb.state.lock"));
    }

    #[tokio::test]
    async fn state_survives_a_write() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);
        assert!(backend.read_state().await.unwrap().is_none());

        let mut state = StateFile::new();
        state.upsert_resource(ResourceState {
            resource_type: "oracle_resource_anchor".to_string(),
            name: "anchor".to_string(),
            identifier: "/subscriptions/s/resourceGroups/rg/providers/Oracle.Database/resourceAnchors/a".to_string(),
            attributes: Default::default(),
        });
        state.increment_serial();
        backend.write_state(&state).await.unwrap();

        let read = backend.read_state().await.unwrap().unwrap();
        assert_eq!(read.serial, 1);
        assert_eq!(read.lineage, state.lineage);
        assert_eq!(read.resources, state.resources);
    }

    #[tokio::test]
    async fn write_rejects_other_lineage_and_stale_serial() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);

        let mut state = StateFile::new();
        state.increment_serial();
        backend.write_state(&state).await.unwrap();

        let mut other = StateFile::new();
        other.increment_serial();
        other.increment_serial();
        assert!(matches!(
            backend.write_state(&other).await,
            Err(BackendError::LineageMismatch { .. })
        ));

        assert!(matches!(
            backend.write_state(&state).await,
            Err(BackendError::StaleSerial {
                stored: 1,
                actual: 1
            })
        ));
    }

    #[tokio::test]
    async fn lock_is_exclusive_until_released() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);

        let lock = backend.acquire_lock("apply").await.unwrap();
        assert!(matches!(
            backend.acquire_lock("destroy").await,
            Err(BackendError::Locked { .. })
        ));

        backend.release_lock(&lock).await.unwrap();
        let again = backend.acquire_lock("destroy").await.unwrap();
        assert_eq!(again.operation, "destroy");
    }

    #[tokio::test]
    async fn expired_lock_is_taken_over() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);
        let stale = LockInfo::with_timeout("apply", -60);
        std::fs::write(backend.lock_path(), serde_json::to_string(&stale).unwrap()).unwrap();

        let lock = backend.acquire_lock("apply").await.unwrap();
        assert_ne!(lock.id, stale.id);
    }

    #[tokio::test]
    async fn release_checks_lock_id() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);
        let held = backend.acquire_lock("apply").await.unwrap();

        let other = LockInfo::new("apply");
        assert!(matches!(
            backend.release_lock(&other).await,
            Err(BackendError::LockMismatch { .. })
        ));
        backend.release_lock(&held).await.unwrap();
        assert!(matches!(
            backend.release_lock(&held).await,
            Err(BackendError::LockNotFound(_))
        ));
    }

    #[tokio::test]
    async fn force_unlock_by_id() {
        let dir = tempdir().unwrap();
        let backend = backend(&dir);
        let held = backend.acquire_lock("apply").await.unwrap();

        assert!(backend.force_unlock("wrong-id").await.is_err());
        backend.force_unlock(&held.id).await.unwrap();
        assert!(!backend.lock_path().exists());
    }
}
