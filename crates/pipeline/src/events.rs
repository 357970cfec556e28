//! Outage event clustering: greedy merge of overlapping job intervals.

use crate::jobs::JobRecord;

/// A job record annotated with the outage event it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteredJob {
    pub job: JobRecord,
    /// 1-based event id, monotonically increasing in event start order.
    pub event_id: u32,
}

/// Assigns every job to an outage event.
///
/// Jobs are visited in ascending `start` order (stable, so equal starts
/// keep their input order). A job starting strictly after the running
/// event's end opens a new event; anything else merges, which makes a job
/// starting exactly at the running end a continuation rather than a new
/// event. Merging only ever extends the running end, never shrinks it.
///
/// The returned list is in the same order as the input, not start order.
pub fn cluster(jobs: Vec<JobRecord>) -> Vec<ClusteredJob> {
    let mut order: Vec<usize> = (0..jobs.len()).collect();
    order.sort_by_key(|&i| jobs[i].start);

    let mut assigned = vec![0u32; jobs.len()];
    let mut event_id = 0u32;
    let mut current_end: Option<i64> = None;

    for &i in &order {
        let job = &jobs[i];
        match current_end {
            Some(end) if job.start <= end => {
                if job.end > end {
                    current_end = Some(job.end);
                }
            }
            _ => {
                event_id += 1;
                current_end = Some(job.end);
            }
        }
        assigned[i] = event_id;
    }

    tracing::debug!(jobs = jobs.len(), events = event_id, "clustered jobs into events");

    jobs.into_iter()
        .zip(assigned)
        .map(|(job, event_id)| ClusteredJob { job, event_id })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn job(job_id: &str, start: i64, end: i64) -> JobRecord {
        JobRecord {
            job_id: job_id.to_string(),
            start,
            end,
            length_hours: (end - start).div_euclid(3600),
            cause: String::new(),
            geometry: geo::Geometry::Polygon(geo::polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
            ]),
        }
    }

    fn event_ids(clustered: &[ClusteredJob]) -> Vec<u32> {
        clustered.iter().map(|c| c.event_id).collect()
    }

    #[test]
    fn test_overlapping_and_disjoint_intervals() {
        let clustered = cluster(vec![job("a", 0, 10), job("b", 5, 15), job("c", 20, 25)]);
        assert_eq!(event_ids(&clustered), [1, 1, 2]);
    }

    #[test]
    fn test_adjacent_boundary_merges() {
        // A start equal to the running event's end is a continuation.
        let clustered = cluster(vec![job("a", 0, 10), job("b", 10, 20)]);
        assert_eq!(event_ids(&clustered), [1, 1]);
    }

    #[test]
    fn test_strictly_after_splits() {
        let clustered = cluster(vec![job("a", 0, 10), job("b", 11, 20)]);
        assert_eq!(event_ids(&clustered), [1, 2]);
    }

    #[test]
    fn test_contained_interval_does_not_shrink_event() {
        // b is fully inside a; c still overlaps a's end and must merge.
        let clustered = cluster(vec![job("a", 0, 100), job("b", 10, 20), job("c", 50, 120)]);
        assert_eq!(event_ids(&clustered), [1, 1, 1]);
    }

    #[test]
    fn test_preserves_input_order() {
        let clustered = cluster(vec![job("late", 20, 25), job("early", 0, 10)]);
        assert_eq!(clustered[0].job.job_id, "late");
        assert_eq!(clustered[1].job.job_id, "early");
        // ids are assigned in start order: "early" opens event 1
        assert_eq!(event_ids(&clustered), [2, 1]);
    }

    #[test]
    fn test_event_ids_monotone_in_start_order() {
        let clustered = cluster(vec![
            job("a", 0, 1),
            job("b", 5, 6),
            job("c", 10, 11),
            job("d", 10, 12),
        ]);
        assert_eq!(event_ids(&clustered), [1, 2, 3, 3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster(Vec::new()).is_empty());
    }
}
