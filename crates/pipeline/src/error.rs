use thiserror::Error;

/// Errors that can occur in the derivation pipeline. The stages are pure,
/// so these are all input-validation failures and fatal to the run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A record's geometry is missing or not convertible to a polygon type.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Parcel layer and outage geometries are in different coordinate
    /// reference systems. Checked before the spatial join, never corrected.
    #[error("CRS mismatch: parcels are {parcels}, outages are {outages}")]
    CrsMismatch { parcels: String, outages: String },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
