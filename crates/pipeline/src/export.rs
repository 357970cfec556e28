//! Merged-output artifact: one GeoJSON feature per clustered job.

use crate::events::ClusteredJob;
use geojson::{Feature, FeatureCollection, JsonObject};

/// Builds the `merged.geojson` feature collection with fields
/// `job_id, start, end, length, cause, event_id`.
#[must_use]
pub fn merged_collection(jobs: &[ClusteredJob]) -> FeatureCollection {
    let features = jobs
        .iter()
        .map(|clustered| {
            let job = &clustered.job;
            let mut properties = JsonObject::new();
            properties.insert("job_id".to_string(), job.job_id.clone().into());
            properties.insert("start".to_string(), job.start.into());
            properties.insert("end".to_string(), job.end.into());
            properties.insert("length".to_string(), job.length_hours.into());
            properties.insert("cause".to_string(), job.cause.clone().into());
            properties.insert("event_id".to_string(), clustered.event_id.into());

            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&job.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
