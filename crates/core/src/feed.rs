//! Data model for the upstream outage feed.
//!
//! The utility's map server speaks ArcGIS-flavored GeoJSON: upper-case
//! property names, epoch-millisecond timestamps, and a non-standard
//! `exceededTransferLimit` pagination flag on each page body. Field names
//! here mirror the wire format exactly so snapshots round-trip unchanged.

use geojson::Geometry;
use serde::{Deserialize, Serialize};

/// One reported outage record as it appears in the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutageFeature {
    #[serde(rename = "type", default = "feature_type")]
    pub kind: String,
    pub properties: OutageProperties,
    pub geometry: Option<Geometry>,
}

/// Attributes of an outage record. `OFF_DTTM` is absent or null for jobs
/// the utility has reported but not yet timestamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutageProperties {
    #[serde(rename = "JOB_ID")]
    pub job_id: String,

    /// Time power went out, epoch milliseconds.
    #[serde(rename = "OFF_DTTM", default)]
    pub off_dttm: Option<i64>,

    #[serde(rename = "CAUSE", default)]
    pub cause: String,

    #[serde(rename = "OBJECTID", default)]
    pub object_id: i64,
}

/// A full feature collection as persisted by one fetch run.
///
/// `complete` is a foreign member recording whether the producing run
/// consumed every page; absent (e.g. documents written by older tooling)
/// reads as `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(rename = "type", default = "collection_type")]
    pub kind: String,
    pub features: Vec<OutageFeature>,
    #[serde(default = "default_true")]
    pub complete: bool,
}

impl SnapshotDocument {
    #[must_use]
    pub fn new(features: Vec<OutageFeature>, complete: bool) -> Self {
        Self {
            kind: collection_type(),
            features,
            complete,
        }
    }
}

/// A persisted snapshot: the document plus its capture time (unix seconds),
/// recovered from the storage key.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub captured_at: i64,
    pub document: SnapshotDocument,
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

fn default_true() -> bool {
    true
}
