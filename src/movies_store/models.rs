use crate::metadata::EnrichmentRecord;
use crate::tabular::MovieId;
use clap::ValueEnum;

/// How a run treats whatever the database already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LoadMode {
    /// Drop and recreate every table, then insert.
    #[default]
    Destructive,
    /// Create missing tables and append; rows already present are kept.
    Additive,
}

/// A movie after the transform stage, shaped like a `movies` row plus its
/// genre list.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub movie_id: MovieId,
    /// Title with the `(YYYY)` suffix removed.
    pub title: String,
    pub release_year: Option<i32>,
    /// e.g. "1990s"
    pub decade: Option<String>,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub imdb_id: Option<String>,
}

impl Movie {
    pub fn with_enrichment(self, record: EnrichmentRecord) -> Self {
        Self {
            director: record.director,
            plot: record.plot,
            box_office: record.box_office,
            imdb_id: record.imdb_id,
            ..self
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.director.is_some()
            || self.plot.is_some()
            || self.box_office.is_some()
            || self.imdb_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub movies: usize,
    pub ratings: usize,
    pub genres: usize,
    pub movie_genres: usize,
}
