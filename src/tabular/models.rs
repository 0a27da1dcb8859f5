use serde::Deserialize;

pub type MovieId = i64;
pub type UserId = i64;

/// A movie as it appears in the movies file, optionally joined with its
/// IMDb cross-reference from the links file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieRow {
    #[serde(alias = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
    /// Pipe-delimited, e.g. `Adventure|Animation|Children`.
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(skip)]
    pub imdb_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingRow {
    #[serde(alias = "userId")]
    pub user_id: UserId,
    #[serde(alias = "movieId")]
    pub movie_id: MovieId,
    pub rating: f64,
    pub timestamp: i64,
}

/// Cross-reference between a movie and its IMDb entry. The IMDb id is kept
/// as text since the file stores it zero-padded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkRow {
    #[serde(alias = "movieId")]
    pub movie_id: MovieId,
    #[serde(alias = "imdbId", default)]
    pub imdb_id: Option<String>,
}
