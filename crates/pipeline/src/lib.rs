//! Derivation pipeline over accumulated outage snapshots.
//!
//! Stages run in order: [`jobs::aggregate`] collapses all snapshots into
//! one record per job, [`events::cluster`] merges overlapping job intervals
//! into discrete outage events, and [`parcels::summarize`] joins job
//! geometries against the residential parcel layer. Every stage is a pure
//! function over immutable inputs; derived data is recomputed from scratch
//! on each run.

pub mod error;
pub mod events;
pub mod export;
pub mod jobs;
pub mod parcels;

pub use error::PipelineError;
pub use events::{cluster, ClusteredJob};
pub use jobs::{aggregate, JobRecord};
pub use parcels::{summarize, Parcel, ParcelLayer, ParcelSummary, DEFAULT_CRS};
