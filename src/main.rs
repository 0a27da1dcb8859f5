use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};

use movies_etl::config::{AppConfig, CliConfig, FileConfig, OMDB_API_KEY_ENV};
use movies_etl::movies_store::{LoadMode, SqliteMoviesStore};
use movies_etl::tabular::InputTables;
use movies_etl::{init_tracing, load, transform_movies, OmdbClient};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[clap(about = "Load MovieLens movies and ratings into SQLite, enriched from OMDb")]
struct CliArgs {
    /// Path to the movies CSV (movieId,title,genres).
    #[clap(long, value_parser = parse_path)]
    pub movies: Option<PathBuf>,

    /// Path to the ratings CSV (userId,movieId,rating,timestamp).
    #[clap(long, value_parser = parse_path)]
    pub ratings: Option<PathBuf>,

    /// Optional links CSV (movieId,imdbId,tmdbId) used for id lookups.
    #[clap(long, value_parser = parse_path)]
    pub links: Option<PathBuf>,

    /// Path to the SQLite database to write.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Destructive rebuilds every table, additive only adds missing rows.
    #[clap(long, value_enum, default_value_t = LoadMode::Destructive)]
    pub mode: LoadMode,

    /// OMDb API key. Falls back to the config file, then the environment.
    #[clap(long)]
    pub api_key: Option<String>,

    /// OMDb endpoint URL.
    #[clap(long)]
    pub omdb_endpoint: Option<String>,

    /// Timeout in seconds for each OMDb request.
    #[clap(long, default_value_t = 30)]
    pub timeout_sec: u64,

    /// Minimum delay between two OMDb requests, in milliseconds.
    #[clap(long, default_value_t = 0)]
    pub request_interval_ms: u64,

    /// Only look up the first N movies.
    #[clap(long)]
    pub max_lookups: Option<usize>,

    /// Path to a TOML config file. Its values override the flags above.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[clap(long, default_value = "info")]
    pub log_level: LevelFilter,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            movies_path: self.movies.clone(),
            ratings_path: self.ratings.clone(),
            links_path: self.links.clone(),
            db_path: self.db.clone(),
            mode: self.mode,
            api_key: self.api_key.clone(),
            omdb_endpoint: self.omdb_endpoint.clone(),
            timeout_sec: self.timeout_sec,
            request_interval_ms: self.request_interval_ms,
            max_lookups: self.max_lookups,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_tracing(cli_args.log_level)?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(
        &cli_args.to_cli_config(),
        file_config,
        std::env::var(OMDB_API_KEY_ENV).ok(),
    )?;

    info!("Reading input files...");
    let inputs = InputTables::load(
        &config.movies_path,
        &config.ratings_path,
        config.links_path.as_deref(),
    )?;

    let omdb = OmdbClient::new(&config.omdb).context("Failed to build OMDb client")?;
    let transformed = transform_movies(&inputs.movies, &omdb, config.max_lookups);

    info!("Opening SQLite movies database at {:?}...", config.db_path);
    let mut store = SqliteMoviesStore::new(&config.db_path)?;
    let load_stats = load(
        &mut store,
        &transformed.movies,
        &inputs.ratings,
        config.mode,
    )?;

    let counts = store.get_counts()?;
    info!(
        "Run summary: {} movies read, {} enriched, {} lookups missed, {} ratings skipped",
        inputs.movies.len(),
        transformed.stats.matched,
        transformed.stats.not_found,
        load_stats.ratings_skipped
    );
    info!(
        "Table counts: movies={} ratings={} genres={} movie_genres={}",
        counts.movies, counts.ratings, counts.genres, counts.movie_genres
    );

    println!("ETL process completed successfully.");
    Ok(())
}
