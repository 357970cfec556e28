use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub store: StoreConfig,
    pub parcels: ParcelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Fully formed query URL; the client appends `&resultOffset=<n>`.
    pub query_url: String,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory of the blob namespace.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelConfig {
    /// GeoJSON file holding the land-use parcel layer.
    pub path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig {
                query_url: "https://outagemap.serv.dteenergy.com/GISRest/services/OMP/OutageLocations/MapServer/2/query?WHERE=OBJECTID%3E0&outFields=*&f=geojson".to_string(),
                max_retries: 5,
                retry_delay_secs: 1,
            },
            store: StoreConfig {
                root: "data/blobs".to_string(),
            },
            parcels: ParcelConfig {
                path: "data/landuse.geojson".to_string(),
            },
        }
    }
}
