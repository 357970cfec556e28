//! Snapshot persistence over a key/blob namespace.

pub mod blob;
pub mod error;
pub mod snapshot;

pub use blob::{BlobStore, FsBlobStore};
pub use error::{Result, StoreError};
pub use snapshot::{snapshot_key, SnapshotStore, SNAPSHOT_PREFIX};
