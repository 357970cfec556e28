pub mod config;
pub mod config_loader;
pub mod feed;

pub use config::{AppConfig, FetchConfig, ParcelConfig, StoreConfig};
pub use config_loader::ConfigLoader;
pub use feed::{OutageFeature, OutageProperties, Snapshot, SnapshotDocument};
