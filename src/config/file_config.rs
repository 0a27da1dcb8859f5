use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from the optional TOML file. Every field can also be given
/// on the command line; values here win.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub movies_path: Option<String>,
    pub ratings_path: Option<String>,
    pub links_path: Option<String>,
    pub db_path: Option<String>,
    /// "destructive" or "additive"
    pub mode: Option<String>,
    pub max_lookups: Option<usize>,

    pub omdb: Option<OmdbConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct OmdbConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_sec: Option<u64>,
    pub request_interval_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
