//! Reports run against a database produced by the pipeline.

mod common;

use common::*;
use movies_etl::metadata::EnrichmentRecord;
use movies_etl::movies_store::{LoadMode, SqliteMoviesStore};
use movies_etl::reports::{
    average_rating_by_year, most_prolific_director, top_genres, top_rated_movie,
    TOP_GENRES_LIMIT,
};

fn directed_by(name: &str) -> EnrichmentRecord {
    EnrichmentRecord {
        director: Some(name.to_string()),
        ..Default::default()
    }
}

fn loaded_sample() -> TestInputs {
    let inputs = TestInputs::write(SAMPLE_MOVIES, SAMPLE_RATINGS, Some(SAMPLE_LINKS)).unwrap();
    let config = inputs.config(LoadMode::Destructive).unwrap();
    let lookup = StubLookup::always_missing()
        .with_match("Toy Story", directed_by("John Lasseter"))
        .with_match("Jumanji", directed_by("Joe Johnston"))
        .with_match("Heat", directed_by("Michael Mann"));
    run_pipeline(&config, &lookup).unwrap();
    inputs
}

#[test]
fn test_reports_over_loaded_database() {
    let inputs = loaded_sample();
    let store = SqliteMoviesStore::open_read_only(&inputs.db).unwrap();
    let conn = store.connection();

    // Toy Story 4.5 (2), Heat 4.5 (2), Jumanji 3.5 (1)
    let best = top_rated_movie(conn, 2).unwrap().unwrap();
    assert_eq!(best.avg_rating, 4.5);
    assert_eq!(best.num_ratings, 2);
    assert!(best.title == "Toy Story" || best.title == "Heat");
    assert!(top_rated_movie(conn, 50).unwrap().is_none());

    // Adventure/Children/Fantasy: 4.0, 5.0 and 3.5 -> 4.17 over 3
    let genres = top_genres(conn, 3, TOP_GENRES_LIMIT).unwrap();
    assert_eq!(genres.len(), 3);
    assert!(genres.iter().all(|g| g.num_ratings == 3));
    assert!(genres.iter().all(|g| g.avg_rating == 4.17));

    let director = most_prolific_director(conn).unwrap().unwrap();
    assert_eq!(director.movie_count, 1);

    let years = average_rating_by_year(conn).unwrap();
    assert_eq!(years.len(), 1);
    assert_eq!(years[0].year, 1995);
    assert_eq!(years[0].num_ratings, 5);
    assert_eq!(years[0].avg_rating, 4.3);
}

#[test]
fn test_reports_require_existing_database() {
    let inputs = TestInputs::write(MOVIES_HEADER, RATINGS_HEADER, None).unwrap();
    assert!(SqliteMoviesStore::open_read_only(&inputs.db).is_err());
}
