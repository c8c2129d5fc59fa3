use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ImporterError;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub node: NodeSettings,
    #[serde(default)]
    pub importer: ImporterSettings,
    pub clickhouse: ClickhouseSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct NodeSettings {
    pub ws_url: String,
    pub http_url: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct ImporterSettings {
    /// Cap on concurrently running block enrichment tasks.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for ImporterSettings {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

fn default_max_in_flight() -> usize {
    8
}

#[derive(Deserialize, Debug, Clone)]
pub struct ClickhouseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ImporterError> {
        match toml::from_slice(&fs::read(path)?) {
            Ok(config) => Ok(config),
            Err(e) => Err(ImporterError::ParsingError(format!(
                "Failed to parse toml {e:?}"
            ))),
        }
    }
}
