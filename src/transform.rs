//! Turns raw movie rows into [`Movie`]s: release year and decade from the
//! title, a cleaned title, the genre list, and OMDb enrichment.
//!
//! Enrichment runs as a separate pass that produces a
//! `movie_id -> EnrichmentRecord` map, merged into the derived movies at
//! the end. A failed lookup only costs that movie its enrichment fields.

use crate::metadata::{EnrichmentRecord, LookupOutcome, LookupQuery, MetadataLookup};
use crate::movies_store::Movie;
use crate::tabular::{MovieId, MovieRow};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

const GENRE_DELIMITER: char = '|';

lazy_static! {
    static ref YEAR_IN_PARENS: Regex = Regex::new(r"\((\d{4})\)").unwrap();
}

/// Year from the first `(YYYY)` group in the title.
pub fn extract_year(title: &str) -> Option<i32> {
    YEAR_IN_PARENS
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// `1994` -> `"1990s"`.
pub fn decade_label(year: Option<i32>) -> Option<String> {
    year.map(|year| format!("{}s", year.div_euclid(10) * 10))
}

pub fn clean_title(title: &str) -> String {
    YEAR_IN_PARENS.replace_all(title, "").trim().to_string()
}

pub fn split_genres(field: Option<&str>) -> Vec<String> {
    field
        .unwrap_or_default()
        .split(GENRE_DELIMITER)
        .map(str::trim)
        .filter(|genre| !genre.is_empty())
        .map(str::to_string)
        .collect()
}

/// Everything that can be computed from the row alone.
pub fn derive_movie(row: &MovieRow) -> Movie {
    let release_year = extract_year(&row.title);
    Movie {
        movie_id: row.movie_id,
        title: clean_title(&row.title),
        release_year,
        decade: decade_label(release_year),
        genres: split_genres(row.genres.as_deref()),
        director: None,
        plot: None,
        box_office: None,
        imdb_id: None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformStats {
    pub lookups: usize,
    pub matched: usize,
    pub not_found: usize,
    /// Rows past the lookup cap, or repeating an earlier movie id.
    pub skipped: usize,
}

#[derive(Debug)]
pub struct Transformed {
    pub movies: Vec<Movie>,
    pub stats: TransformStats,
}

fn enrich<L: MetadataLookup + ?Sized>(
    rows: &[MovieRow],
    derived: &[Movie],
    lookup: &L,
    max_lookups: Option<usize>,
) -> (HashMap<MovieId, EnrichmentRecord>, TransformStats) {
    let mut enrichments = HashMap::new();
    let mut seen = HashSet::with_capacity(rows.len());
    let mut stats = TransformStats::default();

    for (index, (row, movie)) in rows.iter().zip(derived).enumerate() {
        if max_lookups.is_some_and(|max| index >= max) {
            stats.skipped += 1;
            continue;
        }
        // The map is keyed by id, so only the first row with an id may fill it
        if !seen.insert(row.movie_id) {
            warn!(
                "Skipping lookup for {}: movie id {} already seen",
                row.title, row.movie_id
            );
            stats.skipped += 1;
            continue;
        }

        let query = LookupQuery {
            title: movie.title.clone(),
            imdb_ref: row.imdb_ref.clone(),
            year: movie.release_year,
        };
        stats.lookups += 1;
        match lookup.lookup(&query) {
            LookupOutcome::Matched(record) => {
                debug!("Enriched {} ({})", row.title, row.movie_id);
                stats.matched += 1;
                enrichments.insert(row.movie_id, record);
            }
            LookupOutcome::NotFound => {
                warn!("OMDb data not found for: {}", row.title);
                stats.not_found += 1;
            }
        }
    }

    (enrichments, stats)
}

fn merge(derived: Vec<Movie>, mut enrichments: HashMap<MovieId, EnrichmentRecord>) -> Vec<Movie> {
    derived
        .into_iter()
        .map(|movie| match enrichments.remove(&movie.movie_id) {
            Some(record) => movie.with_enrichment(record),
            None => movie,
        })
        .collect()
}

/// Derive and enrich every row, in input order. Only the first
/// `max_lookups` rows are looked up when a cap is given. A row repeating an
/// earlier movie id is never enriched.
pub fn transform_movies<L: MetadataLookup + ?Sized>(
    rows: &[MovieRow],
    lookup: &L,
    max_lookups: Option<usize>,
) -> Transformed {
    info!("Transforming {} movies", rows.len());
    let derived: Vec<Movie> = rows.iter().map(derive_movie).collect();
    let (enrichments, stats) = enrich(rows, &derived, lookup, max_lookups);
    info!(
        "Enrichment: {} lookups, {} matched, {} not found, {} skipped",
        stats.lookups, stats.matched, stats.not_found, stats.skipped
    );

    Transformed {
        movies: merge(derived, enrichments),
        stats,
    }
}
