//! Key/blob storage seam.
//!
//! The pipeline only needs three operations from object storage: write a
//! blob, read a blob, and list keys under a prefix. Production deployments
//! point this at a bucket; tests and single-host runs use the filesystem
//! implementation below.

use crate::error::{Result, StoreError};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Minimal object-storage interface: atomic single-object writes,
/// reads by key, and list-by-prefix.
pub trait BlobStore {
    /// Writes `bytes` under `key`, replacing any existing blob atomically.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Reads the blob stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Lists all keys starting with `prefix`, in unspecified order.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Filesystem-backed blob store rooted at a directory. Keys are
/// slash-separated relative paths under the root.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write-then-rename so readers never observe a half-written blob.
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.resolve(key)?;
        Ok(fs::read(path)?)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        if self.root.exists() {
            walk(&self.root, &self.root, &mut keys)?;
        }
        keys.retain(|k| k.starts_with(prefix));
        Ok(keys)
    }
}

fn walk(root: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, keys)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let key = relative
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(key);
        }
    }
    Ok(())
}
