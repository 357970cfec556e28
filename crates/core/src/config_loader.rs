use crate::config::AppConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration by merging built-in defaults, a TOML
    /// file, and `GRIDWATCH_`-prefixed environment variables.
    ///
    /// A missing TOML file falls back to the defaults; a malformed one is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be parsed or a
    /// value fails to deserialize.
    pub fn load(path: &str) -> Result<AppConfig> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("GRIDWATCH_").split("__"))
            .extract()?;

        Ok(config)
    }
}
