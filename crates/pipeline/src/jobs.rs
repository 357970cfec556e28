//! Job aggregation: collapse all snapshots into one record per job.

use crate::error::{PipelineError, Result};
use gridwatch_core::feed::{OutageFeature, Snapshot};
use std::collections::HashMap;

/// One outage job, derived from every snapshot observation of it.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub job_id: String,

    /// Earliest reported off time across all observations, unix seconds.
    pub start: i64,

    /// Capture time of the last snapshot still reporting the job, unix
    /// seconds. A resolved job simply disappears from later snapshots, so
    /// this is a proxy for restoration time bounded by the fetch cadence.
    pub end: i64,

    /// Floor of `(end - start)` in whole hours.
    pub length_hours: i64,

    /// Cause from the most recent observation.
    pub cause: String,

    /// Geometry from the most recent observation.
    pub geometry: geo::Geometry<f64>,
}

/// One sighting of a feature inside a particular snapshot. The tiebreak
/// index is the feature's position within its own snapshot, so ordering by
/// `(snapshot_ttm, index)` is reproducible no matter how the store happened
/// to list the snapshots.
struct Observation<'a> {
    /// Capture time of the parent snapshot, epoch milliseconds.
    snapshot_ttm: i64,
    index: usize,
    feature: &'a OutageFeature,
}

/// Groups every feature across all snapshots by job id and derives one
/// [`JobRecord`] per group.
///
/// Groups where no observation carries an off time are skipped: the
/// upstream feed reports newly created jobs before timestamping them, and
/// a job that never gains a start time cannot be placed on the timeline.
/// That is a data-quality gap, not an error.
///
/// Output order is unspecified; clustering imposes its own order.
///
/// # Errors
///
/// Returns `PipelineError::InvalidGeometry` if the observation selected
/// for a job has no polygonal geometry.
pub fn aggregate(snapshots: &[Snapshot]) -> Result<Vec<JobRecord>> {
    let mut groups: HashMap<&str, Vec<Observation<'_>>> = HashMap::new();
    for snapshot in snapshots {
        let snapshot_ttm = snapshot.captured_at * 1000;
        for (index, feature) in snapshot.document.features.iter().enumerate() {
            groups
                .entry(feature.properties.job_id.as_str())
                .or_default()
                .push(Observation {
                    snapshot_ttm,
                    index,
                    feature,
                });
        }
    }

    let mut records = Vec::with_capacity(groups.len());
    for (job_id, mut observations) in groups {
        observations.sort_by_key(|o| (o.snapshot_ttm, o.index));
        let Some(latest) = observations.last() else {
            continue;
        };

        let Some(start_ms) = observations
            .iter()
            .filter_map(|o| o.feature.properties.off_dttm)
            .min()
        else {
            tracing::debug!(job_id, "no off time in any snapshot, skipping job");
            continue;
        };

        let start = start_ms.div_euclid(1000);
        let end = latest.snapshot_ttm.div_euclid(1000);

        let Some(geojson_geometry) = &latest.feature.geometry else {
            return Err(PipelineError::InvalidGeometry(format!(
                "job {job_id} has no geometry"
            )));
        };
        let geometry = geo::Geometry::<f64>::try_from(geojson_geometry)
            .map_err(|e| PipelineError::InvalidGeometry(format!("job {job_id}: {e}")))?;

        records.push(JobRecord {
            job_id: job_id.to_string(),
            start,
            end,
            length_hours: (end - start).div_euclid(3600),
            cause: latest.feature.properties.cause.clone(),
            geometry,
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use gridwatch_core::feed::{OutageProperties, SnapshotDocument};

    fn feature(job_id: &str, off_dttm: Option<i64>, cause: &str) -> OutageFeature {
        let polygon = geo::Geometry::Polygon(geo::polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
        ]);
        OutageFeature {
            kind: "Feature".to_string(),
            properties: OutageProperties {
                job_id: job_id.to_string(),
                off_dttm,
                cause: cause.to_string(),
                object_id: 0,
            },
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&polygon))),
        }
    }

    fn snapshot(captured_at: i64, features: Vec<OutageFeature>) -> Snapshot {
        Snapshot {
            captured_at,
            document: SnapshotDocument::new(features, true),
        }
    }

    #[test]
    fn test_start_end_and_length() {
        // Job seen in two snapshots an hour apart; earliest off time wins,
        // last capture time becomes the end.
        let snapshots = vec![
            snapshot(10_000, vec![feature("J-1", Some(7_200_000), "Storm")]),
            snapshot(13_600, vec![feature("J-1", Some(7_300_000), "Storm")]),
        ];

        let records = aggregate(&snapshots).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start, 7_200);
        assert_eq!(records[0].end, 13_600);
        assert_eq!(records[0].length_hours, (13_600 - 7_200) / 3600);
    }

    #[test]
    fn test_most_recent_observation_wins_cause() {
        let snapshots = vec![
            snapshot(2_000, vec![feature("J-1", Some(1_000_000), "Under Investigation")]),
            snapshot(1_000, vec![feature("J-1", None, "Wire Down")]),
        ];

        let records = aggregate(&snapshots).unwrap();
        // captured_at 2000 is the latest observation regardless of input order
        assert_eq!(records[0].cause, "Under Investigation");
    }

    #[test]
    fn test_all_missing_off_times_skips_job() {
        let snapshots = vec![
            snapshot(1_000, vec![feature("J-1", None, "New"), feature("J-2", Some(500_000), "Tree")]),
            snapshot(2_000, vec![feature("J-1", None, "New")]),
        ];

        let records = aggregate(&snapshots).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].job_id, "J-2");
    }

    #[test]
    fn test_partial_off_times_keep_job() {
        // A single timestamped observation is enough to resolve a start.
        let snapshots = vec![
            snapshot(1_000, vec![feature("J-1", None, "New")]),
            snapshot(2_000, vec![feature("J-1", Some(900_000), "Tree")]),
        ];

        let records = aggregate(&snapshots).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start, 900);
    }

    #[test]
    fn test_reaggregation_is_idempotent() {
        let snapshots = vec![
            snapshot(1_000, vec![feature("J-1", Some(100_000), "a"), feature("J-2", Some(200_000), "b")]),
            snapshot(2_000, vec![feature("J-2", Some(150_000), "c")]),
        ];

        let sorted = |mut records: Vec<JobRecord>| {
            records.sort_by(|a, b| a.job_id.cmp(&b.job_id));
            records
        };
        let first = sorted(aggregate(&snapshots).unwrap());
        let second = sorted(aggregate(&snapshots).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_geometry_is_fatal() {
        let mut bad = feature("J-1", Some(1_000_000), "Storm");
        bad.geometry = None;
        let snapshots = vec![snapshot(1_000, vec![bad])];

        assert!(matches!(
            aggregate(&snapshots),
            Err(PipelineError::InvalidGeometry(_))
        ));
    }
}
