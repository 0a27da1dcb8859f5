//! Writes transformed movies and raw ratings into the movies database.
//!
//! Each phase commits on its own, so a crash part-way through leaves the
//! earlier phases in place. Re-running in destructive mode rebuilds
//! everything from scratch.

use crate::movies_store::{GenreId, LoadMode, Movie, SqliteMoviesStore};
use crate::tabular::{MovieId, RatingRow};
use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub movies_written: usize,
    pub genres_seen: usize,
    pub genre_links_created: usize,
    pub ratings_inserted: usize,
    pub ratings_skipped: usize,
}

fn genre_names(movies: &[Movie]) -> BTreeSet<String> {
    movies
        .iter()
        .flat_map(|movie| movie.genres.iter().cloned())
        .collect()
}

/// Resolve every (movie, genre name) to a (movie, genre id) pair. Names
/// without an id are logged and left out.
fn genre_pairs(movies: &[Movie], genre_ids: &HashMap<String, GenreId>) -> Vec<(MovieId, GenreId)> {
    let mut pairs = Vec::new();
    for movie in movies {
        for name in &movie.genres {
            match genre_ids.get(name) {
                Some(genre_id) => pairs.push((movie.movie_id, *genre_id)),
                None => warn!(
                    "No id for genre {:?}, movie {} left unlinked",
                    name, movie.movie_id
                ),
            }
        }
    }
    pairs
}

pub fn load(
    store: &mut SqliteMoviesStore,
    movies: &[Movie],
    ratings: &[RatingRow],
    mode: LoadMode,
) -> Result<LoadStats> {
    info!("Loading into SQLite ({:?} mode)", mode);
    store.prepare_schema(mode)?;

    let mut stats = LoadStats::default();

    stats.movies_written = store
        .insert_movies(movies, mode)
        .context("Failed to load movies")?;
    info!("Movies written: {}", stats.movies_written);

    let names = genre_names(movies);
    stats.genres_seen = names.len();
    let genre_ids = store
        .ensure_genres(&names)
        .context("Failed to load genres")?;

    let pairs = genre_pairs(movies, &genre_ids);
    stats.genre_links_created = store
        .link_movie_genres(&pairs)
        .context("Failed to load movie genres")?;
    info!(
        "Genres: {} distinct, {} new movie links",
        stats.genres_seen, stats.genre_links_created
    );

    let inserted = store
        .insert_ratings(ratings)
        .context("Failed to load ratings")?;
    stats.ratings_inserted = inserted.inserted;
    stats.ratings_skipped = inserted.skipped;
    info!(
        "Ratings: {} inserted, {} skipped",
        stats.ratings_inserted, stats.ratings_skipped
    );

    Ok(stats)
}
