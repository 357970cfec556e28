//! Gzipped GeoJSON snapshot codec and key scheme.

use crate::blob::BlobStore;
use crate::error::Result;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use gridwatch_core::feed::{Snapshot, SnapshotDocument};
use std::io::{Read, Write};

/// Prefix of the blob namespace holding snapshots and derived artifacts.
pub const SNAPSHOT_PREFIX: &str = "outages/";

const KEY_STEM: &str = "outages/outage-";
const KEY_EXT: &str = ".geojson.gz";

/// Returns the blob key for a snapshot captured at `captured_at`
/// (unix seconds): `outages/outage-<ts>.geojson.gz`.
#[must_use]
pub fn snapshot_key(captured_at: i64) -> String {
    format!("{KEY_STEM}{captured_at}{KEY_EXT}")
}

fn parse_snapshot_key(key: &str) -> Option<i64> {
    key.strip_prefix(KEY_STEM)?
        .strip_suffix(KEY_EXT)?
        .parse()
        .ok()
}

/// Append-only snapshot store. Snapshots are timestamp-keyed, so distinct
/// fetch runs never collide; nothing here mutates or deletes an existing
/// snapshot.
pub struct SnapshotStore<S: BlobStore> {
    blobs: S,
}

impl<S: BlobStore> SnapshotStore<S> {
    #[must_use]
    pub fn new(blobs: S) -> Self {
        Self { blobs }
    }

    /// Serializes and gzips `document`, storing it under the timestamp key.
    /// Returns the key written.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the blob write fails.
    pub fn put(&self, captured_at: i64, document: &SnapshotDocument) -> Result<String> {
        let key = snapshot_key(captured_at);
        let json = serde_json::to_vec(document)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let bytes = encoder.finish()?;

        tracing::info!(
            key = %key,
            features = document.features.len(),
            complete = document.complete,
            "writing snapshot"
        );
        self.blobs.put(&key, &bytes)?;
        Ok(key)
    }

    /// Loads every snapshot under the `outages/` prefix. Keys that do not
    /// match the snapshot pattern (derived artifacts, stray blobs) are
    /// skipped. Order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if a matching blob cannot be read or decoded.
    pub fn list_all(&self) -> Result<Vec<Snapshot>> {
        let mut snapshots = Vec::new();
        for key in self.blobs.list(SNAPSHOT_PREFIX)? {
            let Some(captured_at) = parse_snapshot_key(&key) else {
                tracing::debug!(key = %key, "skipping non-snapshot key");
                continue;
            };

            let bytes = self.blobs.get(&key)?;
            let mut json = Vec::new();
            GzDecoder::new(&bytes[..]).read_to_end(&mut json)?;
            let document: SnapshotDocument = serde_json::from_slice(&json)?;

            snapshots.push(Snapshot {
                captured_at,
                document,
            });
        }
        Ok(snapshots)
    }

    /// Writes an uncompressed derived artifact (e.g. `merged.geojson`)
    /// under the `outages/` prefix. Returns the key written.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob write fails.
    pub fn put_artifact(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let key = format!("{SNAPSHOT_PREFIX}{name}");
        tracing::info!(key = %key, size = bytes.len(), "writing artifact");
        self.blobs.put(&key, bytes)?;
        Ok(key)
    }
}
