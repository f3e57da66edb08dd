use crate::config::AppConfig;
use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

/// Environment variable prefix; nested keys use `__`, e.g. `PERP_AGENT_BYBIT__API_KEY`.
pub const ENV_PREFIX: &str = "PERP_AGENT_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from a TOML file merged with `PERP_AGENT_` environment variables.
    ///
    /// The file is optional; credentials may come entirely from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the sources cannot be parsed or a required key is missing.
    pub fn load(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
        let config = Self::figment(path).extract::<AppConfig>()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
