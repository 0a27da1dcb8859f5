//! Test fixture creation: scratch input files and a stubbed lookup.

use anyhow::Result;
use movies_etl::config::{AppConfig, CliConfig};
use movies_etl::metadata::{EnrichmentRecord, LookupOutcome, LookupQuery, MetadataLookup};
use movies_etl::movies_store::{LoadMode, SqliteMoviesStore};
use movies_etl::tabular::InputTables;
use movies_etl::transform::{transform_movies, TransformStats};
use movies_etl::{load, LoadStats};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// CSV inputs and a database path inside a temporary directory that lives
/// as long as this value.
pub struct TestInputs {
    _dir: TempDir,
    pub movies: PathBuf,
    pub ratings: PathBuf,
    pub links: Option<PathBuf>,
    pub db: PathBuf,
}

impl TestInputs {
    pub fn write(movies_csv: &str, ratings_csv: &str, links_csv: Option<&str>) -> Result<Self> {
        let dir = TempDir::new()?;
        let movies = dir.path().join("movies.csv");
        let ratings = dir.path().join("ratings.csv");
        fs::write(&movies, movies_csv)?;
        fs::write(&ratings, ratings_csv)?;
        let links = match links_csv {
            Some(content) => {
                let path = dir.path().join("links.csv");
                fs::write(&path, content)?;
                Some(path)
            }
            None => None,
        };
        let db = dir.path().join("movies.db");
        Ok(Self {
            _dir: dir,
            movies,
            ratings,
            links,
            db,
        })
    }

    pub fn config(&self, mode: LoadMode) -> Result<AppConfig> {
        let cli = CliConfig {
            movies_path: Some(self.movies.clone()),
            ratings_path: Some(self.ratings.clone()),
            links_path: self.links.clone(),
            db_path: Some(self.db.clone()),
            mode,
            api_key: Some("test-key".to_string()),
            timeout_sec: 1,
            ..Default::default()
        };
        Ok(AppConfig::resolve(&cli, None, None)?)
    }
}

/// Matches by title; everything else is a miss. Records every query.
#[derive(Default)]
pub struct StubLookup {
    records: HashMap<String, EnrichmentRecord>,
    pub queries: RefCell<Vec<LookupQuery>>,
}

impl StubLookup {
    pub fn always_missing() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, title: &str, record: EnrichmentRecord) -> Self {
        self.records.insert(title.to_string(), record);
        self
    }
}

impl MetadataLookup for StubLookup {
    fn lookup(&self, query: &LookupQuery) -> LookupOutcome {
        self.queries.borrow_mut().push(query.clone());
        match self.records.get(&query.title) {
            Some(record) => LookupOutcome::Matched(record.clone()),
            None => LookupOutcome::NotFound,
        }
    }
}

pub struct PipelineRun {
    pub transform: TransformStats,
    pub load: LoadStats,
}

/// The same sequence the `movies-etl` binary runs, with `lookup` in place
/// of the OMDb client.
pub fn run_pipeline<L: MetadataLookup>(config: &AppConfig, lookup: &L) -> Result<PipelineRun> {
    let inputs = InputTables::load(
        &config.movies_path,
        &config.ratings_path,
        config.links_path.as_deref(),
    )?;
    let transformed = transform_movies(&inputs.movies, lookup, config.max_lookups);
    let mut store = SqliteMoviesStore::new(&config.db_path)?;
    let load_stats = load(&mut store, &transformed.movies, &inputs.ratings, config.mode)?;
    Ok(PipelineRun {
        transform: transformed.stats,
        load: load_stats,
    })
}
