use crate::application::lifecycle::DEFAULT_MAX_ATTEMPTS;
use crate::error::Result;
use chrono::NaiveDate;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "motorent.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// RocksDB directory; in-memory storage when unset.
    pub db_path: Option<PathBuf>,
    pub max_commit_attempts: u32,
    /// Overrides the system date used when opening rentals.
    pub today: Option<NaiveDate>,
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            max_commit_attempts: DEFAULT_MAX_ATTEMPTS,
            today: None,
            log_filter: "motorent=info".to_string(),
        }
    }
}

impl Config {
    /// Layers defaults, the TOML file and `MOTORENT_*` environment variables.
    pub fn load(path_override: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path_override {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment = figment.merge(Env::prefixed("MOTORENT_"));

        figment.extract().map_err(|e| Box::new(e).into())
    }
}
