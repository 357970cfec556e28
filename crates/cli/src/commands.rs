//! Command implementations wiring the pipeline stages together.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use gridwatch_core::feed::SnapshotDocument;
use gridwatch_core::ConfigLoader;
use gridwatch_fetch::{OutageClient, OutageClientConfig};
use gridwatch_pipeline::{aggregate, cluster, export, parcels, ParcelLayer};
use gridwatch_store::{FsBlobStore, SnapshotStore};
use std::time::Duration;
use tracing::{info, warn};

/// Runs one fetch pass and persists the result as a new snapshot.
pub async fn fetch(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;

    let client = OutageClient::new(
        OutageClientConfig::default()
            .with_query_url(config.fetch.query_url.clone())
            .with_max_retries(config.fetch.max_retries)
            .with_retry_delay(Duration::from_secs(config.fetch.retry_delay_secs)),
    )?;

    let outcome = client.fetch_all().await?;
    if !outcome.complete {
        warn!("fetch run incomplete, snapshot will be flagged as partial");
    }

    let captured_at = Utc::now().timestamp();
    let store = SnapshotStore::new(FsBlobStore::new(&config.store.root));
    let document = SnapshotDocument::new(outcome.features, outcome.complete);
    let key = store.put(captured_at, &document)?;

    info!(key = %key, features = document.features.len(), "snapshot stored");
    Ok(())
}

/// Rebuilds all derived data from the accumulated snapshots: job records,
/// outage events, the merged GeoJSON artifact, and the per-parcel summary
/// table consumed by the map renderer.
pub async fn derive(config_path: &str) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let store = SnapshotStore::new(FsBlobStore::new(&config.store.root));

    let snapshots = store.list_all()?;
    if snapshots.is_empty() {
        bail!("no snapshots found under {}", config.store.root);
    }
    info!(snapshots = snapshots.len(), "loaded snapshots");

    let jobs = aggregate(&snapshots)?;
    info!(jobs = jobs.len(), "aggregated job records");

    let clustered = cluster(jobs);
    let events = clustered.iter().map(|c| c.event_id).max().unwrap_or(0);
    info!(events, "clustered outage events");

    let merged = geojson::GeoJson::from(export::merged_collection(&clustered));
    store.put_artifact("merged.geojson", merged.to_string().as_bytes())?;

    let raw = std::fs::read_to_string(&config.parcels.path)
        .with_context(|| format!("reading parcel layer {}", config.parcels.path))?;
    let layer = ParcelLayer::from_geojson(&raw)?;
    let summaries = parcels::summarize(&layer, parcels::DEFAULT_CRS, &clustered)?;

    let table = serde_json::to_vec_pretty(&summaries)?;
    store.put_artifact("parcel-summary.json", &table)?;

    info!(parcels = summaries.len(), "derive run complete");
    Ok(())
}
