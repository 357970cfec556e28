//! Spatial join of outage geometries against the land-parcel layer.

use crate::error::{PipelineError, Result};
use crate::events::ClusteredJob;
use geo::Intersects;
use geojson::GeoJson;
use std::collections::HashSet;
use std::str::FromStr;

/// CRS assumed when a GeoJSON document carries no `crs` member, per
/// RFC 7946 (WGS 84).
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Land-use classification selecting the parcels that get summarized.
const RESIDENTIAL_GROUP: &str = "Residential";

/// One land parcel. `parcel_id` is the feature's position in the source
/// layer, stable across runs of the same input file.
#[derive(Debug, Clone)]
pub struct Parcel {
    pub parcel_id: u64,
    /// Land-use classification from the `GROUP_` field.
    pub group: String,
    pub geometry: geo::Geometry<f64>,
}

/// The parsed parcel layer with its coordinate reference system.
#[derive(Debug, Clone)]
pub struct ParcelLayer {
    pub crs: String,
    pub parcels: Vec<Parcel>,
}

impl ParcelLayer {
    /// Parses a GeoJSON land-use layer. Features without geometry are
    /// rejected; the CRS is read from the legacy `crs` member if present.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidGeometry` if the document is not a
    /// feature collection or a feature's geometry cannot be converted.
    pub fn from_geojson(raw: &str) -> Result<Self> {
        let geojson = GeoJson::from_str(raw)
            .map_err(|e| PipelineError::InvalidGeometry(format!("parcel layer: {e}")))?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(PipelineError::InvalidGeometry(
                "parcel layer is not a FeatureCollection".to_string(),
            ));
        };

        let crs = collection
            .foreign_members
            .as_ref()
            .and_then(|m| m.get("crs"))
            .and_then(|crs| crs.get("properties"))
            .and_then(|props| props.get("name"))
            .and_then(|name| name.as_str())
            .map(normalize_crs)
            .unwrap_or_else(|| DEFAULT_CRS.to_string());

        let mut parcels = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.iter().enumerate() {
            let Some(geojson_geometry) = &feature.geometry else {
                return Err(PipelineError::InvalidGeometry(format!(
                    "parcel feature {index} has no geometry"
                )));
            };
            let geometry = geo::Geometry::<f64>::try_from(geojson_geometry)
                .map_err(|e| PipelineError::InvalidGeometry(format!("parcel {index}: {e}")))?;

            let group = feature
                .properties
                .as_ref()
                .and_then(|p| p.get("GROUP_"))
                .and_then(|g| g.as_str())
                .unwrap_or_default()
                .to_string();

            parcels.push(Parcel {
                parcel_id: index as u64,
                group,
                geometry,
            });
        }

        Ok(Self { crs, parcels })
    }
}

/// Per-parcel outage statistics. `None` means no outage intersected the
/// parcel, which is distinct from a measured zero.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ParcelSummary {
    pub parcel_id: u64,
    pub avg_outage_length_hours: Option<f64>,
    pub outage_count: Option<u64>,
}

/// Summarizes outages per residential parcel.
///
/// Non-residential parcels are dropped entirely; residential parcels are
/// kept even when nothing intersects them (a left join). The average is
/// taken over every intersecting record, while the count is over distinct
/// job ids, so a job reported through several records still counts once.
///
/// # Errors
///
/// Returns `PipelineError::CrsMismatch` when the layer and the outage
/// geometries are not in the same CRS. The join is never attempted on
/// mismatched inputs.
pub fn summarize(
    layer: &ParcelLayer,
    outage_crs: &str,
    jobs: &[ClusteredJob],
) -> Result<Vec<ParcelSummary>> {
    let outage_crs = normalize_crs(outage_crs);
    if layer.crs != outage_crs {
        return Err(PipelineError::CrsMismatch {
            parcels: layer.crs.clone(),
            outages: outage_crs,
        });
    }

    let mut summaries = Vec::new();
    for parcel in layer.parcels.iter().filter(|p| p.group == RESIDENTIAL_GROUP) {
        let mut total_hours = 0i64;
        let mut hits = 0u64;
        let mut distinct_jobs: HashSet<&str> = HashSet::new();

        for clustered in jobs {
            if clustered.job.geometry.intersects(&parcel.geometry) {
                total_hours += clustered.job.length_hours;
                hits += 1;
                distinct_jobs.insert(clustered.job.job_id.as_str());
            }
        }

        summaries.push(ParcelSummary {
            parcel_id: parcel.parcel_id,
            avg_outage_length_hours: (hits > 0).then(|| total_hours as f64 / hits as f64),
            outage_count: (!distinct_jobs.is_empty()).then(|| distinct_jobs.len() as u64),
        });
    }

    tracing::info!(
        residential = summaries.len(),
        with_outages = summaries.iter().filter(|s| s.outage_count.is_some()).count(),
        "summarized parcels"
    );
    Ok(summaries)
}

fn normalize_crs(name: &str) -> String {
    // RFC 7946's default CRS under its urn spelling.
    if name == "urn:ogc:def:crs:OGC:1.3:CRS84" {
        DEFAULT_CRS.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobRecord;
    use geo::polygon;

    fn unit_square_at(x: f64, y: f64) -> geo::Geometry<f64> {
        geo::Geometry::Polygon(geo::polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
        ])
    }

    fn parcel(parcel_id: u64, group: &str, x: f64, y: f64) -> Parcel {
        Parcel {
            parcel_id,
            group: group.to_string(),
            geometry: unit_square_at(x, y),
        }
    }

    fn clustered(job_id: &str, length_hours: i64, x: f64, y: f64) -> ClusteredJob {
        ClusteredJob {
            job: JobRecord {
                job_id: job_id.to_string(),
                start: 0,
                end: length_hours * 3600,
                length_hours,
                cause: String::new(),
                geometry: unit_square_at(x, y),
            },
            event_id: 1,
        }
    }

    fn layer(parcels: Vec<Parcel>) -> ParcelLayer {
        ParcelLayer {
            crs: DEFAULT_CRS.to_string(),
            parcels,
        }
    }

    #[test]
    fn test_non_residential_parcels_excluded() {
        let layer = layer(vec![
            parcel(0, "Residential", 0.0, 0.0),
            parcel(1, "Industrial", 10.0, 10.0),
        ]);

        let summaries = summarize(&layer, DEFAULT_CRS, &[]).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].parcel_id, 0);
    }

    #[test]
    fn test_parcel_without_outages_has_null_stats() {
        let layer = layer(vec![parcel(0, "Residential", 0.0, 0.0)]);
        let jobs = vec![clustered("J-1", 4, 50.0, 50.0)]; // far away

        let summaries = summarize(&layer, DEFAULT_CRS, &jobs).unwrap();
        assert_eq!(summaries[0].avg_outage_length_hours, None);
        assert_eq!(summaries[0].outage_count, None);
    }

    #[test]
    fn test_zero_length_outage_distinct_from_no_outage() {
        let layer = layer(vec![parcel(0, "Residential", 0.0, 0.0)]);
        let jobs = vec![clustered("J-1", 0, 0.5, 0.5)];

        let summaries = summarize(&layer, DEFAULT_CRS, &jobs).unwrap();
        assert_eq!(summaries[0].avg_outage_length_hours, Some(0.0));
        assert_eq!(summaries[0].outage_count, Some(1));
    }

    #[test]
    fn test_average_over_intersecting_jobs() {
        let layer = layer(vec![parcel(0, "Residential", 0.0, 0.0)]);
        let jobs = vec![
            clustered("J-1", 2, 0.0, 0.0),
            clustered("J-2", 6, 0.5, 0.5),
            clustered("J-3", 100, 50.0, 50.0), // does not intersect
        ];

        let summaries = summarize(&layer, DEFAULT_CRS, &jobs).unwrap();
        assert_eq!(summaries[0].avg_outage_length_hours, Some(4.0));
        assert_eq!(summaries[0].outage_count, Some(2));
    }

    #[test]
    fn test_duplicate_job_records_count_once() {
        let layer = layer(vec![parcel(0, "Residential", 0.0, 0.0)]);
        let jobs = vec![
            clustered("J-1", 2, 0.0, 0.0),
            clustered("J-1", 2, 0.2, 0.2),
        ];

        let summaries = summarize(&layer, DEFAULT_CRS, &jobs).unwrap();
        assert_eq!(summaries[0].outage_count, Some(1));
    }

    #[test]
    fn test_crs_mismatch_rejected() {
        let mut mismatched = layer(vec![parcel(0, "Residential", 0.0, 0.0)]);
        mismatched.crs = "EPSG:3857".to_string();

        assert!(matches!(
            summarize(&mismatched, DEFAULT_CRS, &[]),
            Err(PipelineError::CrsMismatch { .. })
        ));
    }

    #[test]
    fn test_from_geojson_reads_crs_and_groups() {
        let raw = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
            "features": [
                {
                    "type": "Feature",
                    "properties": {"GROUP_": "Residential"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"GROUP_": "Commercial"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]]]
                    }
                }
            ]
        }"#;

        let layer = ParcelLayer::from_geojson(raw).unwrap();
        assert_eq!(layer.crs, DEFAULT_CRS);
        assert_eq!(layer.parcels.len(), 2);
        assert_eq!(layer.parcels[0].parcel_id, 0);
        assert_eq!(layer.parcels[0].group, "Residential");
        assert_eq!(layer.parcels[1].group, "Commercial");
    }
}
