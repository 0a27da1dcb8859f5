//! CSV input for the pipeline: movies, ratings and the optional links file.
//!
//! Every reader loads the whole file up front. Any unreadable file or
//! malformed record is fatal, since it happens before processing starts.

mod models;

pub use models::{LinkRow, MovieId, MovieRow, RatingRow, UserId};

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {path:?}: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R, path: &Path) -> Result<Vec<T>, ReaderError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.map_err(|source| ReaderError::Record {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ReaderError> {
    let file = std::fs::File::open(path).map_err(|source| ReaderError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = read_rows(file, path)?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn read_movies(path: &Path) -> Result<Vec<MovieRow>, ReaderError> {
    read_file(path)
}

pub fn read_ratings(path: &Path) -> Result<Vec<RatingRow>, ReaderError> {
    read_file(path)
}

pub fn read_links(path: &Path) -> Result<Vec<LinkRow>, ReaderError> {
    read_file(path)
}

/// Left-join links onto movies: a movie without a link, or with an empty
/// IMDb id, keeps `imdb_ref = None`.
pub fn attach_links(movies: &mut [MovieRow], links: Vec<LinkRow>) {
    let by_movie: HashMap<MovieId, String> = links
        .into_iter()
        .filter_map(|link| {
            let imdb_id = link.imdb_id?.trim().to_string();
            (!imdb_id.is_empty()).then_some((link.movie_id, imdb_id))
        })
        .collect();

    let mut linked = 0usize;
    for movie in movies.iter_mut() {
        movie.imdb_ref = by_movie.get(&movie.movie_id).cloned();
        if movie.imdb_ref.is_some() {
            linked += 1;
        }
    }
    info!("Linked {} of {} movies to IMDb ids", linked, movies.len());
}

/// Keep the first row for each movie id. Later rows with the same id are
/// logged and dropped.
pub fn drop_duplicate_movies(movies: Vec<MovieRow>) -> Vec<MovieRow> {
    let mut seen = HashSet::with_capacity(movies.len());
    movies
        .into_iter()
        .filter(|movie| {
            let first = seen.insert(movie.movie_id);
            if !first {
                warn!(
                    "Duplicate movie id {} ({:?}), keeping the first row",
                    movie.movie_id, movie.title
                );
            }
            first
        })
        .collect()
}

/// Everything the pipeline reads from disk for one run.
#[derive(Debug, Default)]
pub struct InputTables {
    pub movies: Vec<MovieRow>,
    pub ratings: Vec<RatingRow>,
}

impl InputTables {
    pub fn load(
        movies_path: &Path,
        ratings_path: &Path,
        links_path: Option<&Path>,
    ) -> Result<Self, ReaderError> {
        let mut movies = drop_duplicate_movies(read_movies(movies_path)?);
        let ratings = read_ratings(ratings_path)?;
        if let Some(links_path) = links_path {
            let links = read_links(links_path)?;
            attach_links(&mut movies, links);
        }
        info!("Read {} movies and {} ratings", movies.len(), ratings.len());
        Ok(Self { movies, ratings })
    }
}
