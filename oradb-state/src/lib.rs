//! oradb State Management
//!
//! Tracks which remote object each declared resource maps to, together with
//! the attributes last read from it.
//!
//! # Overview
//!
//! - **StateFile**: Every tracked resource, with a serial and lineage
//! - **StateBackend**: Storage for the state file and its lock
//! - **LockInfo**: Who holds the state and until when
//!
//! # Example
//!
//! ```ignore
//! use oradb_state::{LocalBackend, StateBackend};
//!
//! let backend = LocalBackend::new();
//! let lock = backend.acquire_lock("apply").await?;
//! let mut state = backend.read_state().await?.unwrap_or_default();
//!
//! // ... record created resources ...
//!
//! state.increment_serial();
//! backend.write_state(&state).await?;
//! backend.release_lock(&lock).await?;
//! ```

pub mod backend;
pub mod backends;
pub mod lock;
pub mod state;

// Re-export main types for convenience
pub use backend::{BackendError, BackendResult, StateBackend};
pub use backends::LocalBackend;
pub use lock::LockInfo;
pub use state::{ResourceState, StateFile};
