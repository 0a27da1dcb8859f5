mod file_config;

pub use file_config::{FileConfig, OmdbConfig};

use crate::movies_store::LoadMode;
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OMDB_ENDPOINT: &str = "http://www.omdbapi.com/";
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "OMDb API key missing: pass --api-key, set omdb.api_key in the config file or export {}",
        OMDB_API_KEY_ENV
    )]
    MissingApiKey,

    #[error("{0} must be specified on the command line or in the config file")]
    MissingSetting(&'static str),

    #[error("Input file does not exist: {0:?}")]
    MissingInput(PathBuf),

    #[error("Unknown load mode {0:?}, expected \"destructive\" or \"additive\"")]
    InvalidMode(String),
}

/// CLI arguments that take part in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub movies_path: Option<PathBuf>,
    pub ratings_path: Option<PathBuf>,
    pub links_path: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub mode: LoadMode,
    pub api_key: Option<String>,
    pub omdb_endpoint: Option<String>,
    pub timeout_sec: u64,
    pub request_interval_ms: u64,
    pub max_lookups: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct OmdbSettings {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub request_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub movies_path: PathBuf,
    pub ratings_path: PathBuf,
    pub links_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub mode: LoadMode,
    /// Only the first `max_lookups` movies are looked up; `None` means all.
    pub max_lookups: Option<usize>,
    pub omdb: OmdbSettings,
}

fn existing_input(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::MissingInput(path))
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments, an optional TOML file and
    /// the API key found in the environment (if any). TOML values override
    /// CLI values where present. The API key is taken from the CLI first,
    /// then the file, then the environment.
    pub fn resolve(
        cli: &CliConfig,
        file_config: Option<FileConfig>,
        env_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let file = file_config.unwrap_or_default();
        let omdb_file = file.omdb.unwrap_or_default();

        let api_key = cli
            .api_key
            .clone()
            .or(omdb_file.api_key)
            .or(env_api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let movies_path = file
            .movies_path
            .map(PathBuf::from)
            .or_else(|| cli.movies_path.clone())
            .ok_or(ConfigError::MissingSetting("movies_path"))?;
        let ratings_path = file
            .ratings_path
            .map(PathBuf::from)
            .or_else(|| cli.ratings_path.clone())
            .ok_or(ConfigError::MissingSetting("ratings_path"))?;
        let links_path = file
            .links_path
            .map(PathBuf::from)
            .or_else(|| cli.links_path.clone());
        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or(ConfigError::MissingSetting("db_path"))?;

        let movies_path = existing_input(movies_path)?;
        let ratings_path = existing_input(ratings_path)?;
        let links_path = links_path.map(existing_input).transpose()?;

        let mode = match file.mode {
            Some(mode) => parse_load_mode(&mode).ok_or(ConfigError::InvalidMode(mode))?,
            None => cli.mode,
        };

        let omdb = OmdbSettings {
            endpoint: omdb_file
                .endpoint
                .or_else(|| cli.omdb_endpoint.clone())
                .unwrap_or_else(|| DEFAULT_OMDB_ENDPOINT.to_string()),
            api_key,
            timeout: Duration::from_secs(omdb_file.timeout_sec.unwrap_or(cli.timeout_sec)),
            request_interval: Duration::from_millis(
                omdb_file
                    .request_interval_ms
                    .unwrap_or(cli.request_interval_ms),
            ),
        };

        Ok(Self {
            movies_path,
            ratings_path,
            links_path,
            db_path,
            mode,
            max_lookups: file.max_lookups.or(cli.max_lookups),
            omdb,
        })
    }
}

/// Uses clap's ValueEnum trait for parsing.
fn parse_load_mode(s: &str) -> Option<LoadMode> {
    LoadMode::from_str(s, true).ok()
}
