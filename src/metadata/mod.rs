//! Movie metadata enrichment via the OMDb API.
//!
//! The transform stage only sees the [`MetadataLookup`] trait, so tests can
//! drive it with canned outcomes instead of the network.

pub mod omdb;

pub use omdb::{normalize_imdb_id, sanitize_title, OmdbClient};

/// The four fields a successful lookup contributes to a movie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentRecord {
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<String>,
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Matched(EnrichmentRecord),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub title: String,
    /// Raw cross-reference id as read from the links file.
    pub imdb_ref: Option<String>,
    pub year: Option<i32>,
}

pub trait MetadataLookup {
    /// Issue one lookup. Transport and parse failures come back as
    /// [`LookupOutcome::NotFound`], never as an error.
    fn lookup(&self, query: &LookupQuery) -> LookupOutcome;
}
