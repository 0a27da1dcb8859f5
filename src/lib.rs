//! Movies ETL Library
//!
//! Reads the MovieLens CSV exports, enriches each movie from OMDb and loads
//! the result into a normalized SQLite database. The `movies-etl` and
//! `run-queries` binaries are thin wrappers around these modules.

pub mod config;
pub mod loader;
pub mod metadata;
pub mod movies_store;
pub mod reports;
pub mod sqlite_persistence;
pub mod tabular;
pub mod transform;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, ConfigError, FileConfig};
pub use loader::{load, LoadStats};
pub use metadata::{LookupOutcome, LookupQuery, MetadataLookup, OmdbClient};
pub use movies_store::{LoadMode, Movie, SqliteMoviesStore};
pub use transform::{transform_movies, TransformStats};

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_tracing(default_level: LevelFilter) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .try_init()?;
    Ok(())
}
