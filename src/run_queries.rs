use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};

use movies_etl::reports::{
    average_rating_by_year, most_prolific_director, top_genres, top_rated_movie,
    DEFAULT_MIN_GENRE_RATINGS, DEFAULT_MIN_MOVIE_RATINGS, TOP_GENRES_LIMIT,
};
use movies_etl::{init_tracing, SqliteMoviesStore};

#[derive(Parser, Debug)]
#[clap(about = "Print the fixed reports over a loaded movies database")]
struct CliArgs {
    /// Path to the SQLite database produced by movies-etl.
    pub db: PathBuf,

    /// Minimum number of ratings for the top rated movie.
    #[clap(long, default_value_t = DEFAULT_MIN_MOVIE_RATINGS)]
    pub min_movie_ratings: i64,

    /// Minimum number of ratings for a genre to be ranked.
    #[clap(long, default_value_t = DEFAULT_MIN_GENRE_RATINGS)]
    pub min_genre_ratings: i64,

    #[clap(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_tracing(cli_args.log_level)?;

    info!("Opening {:?}", cli_args.db);
    let store = SqliteMoviesStore::open_read_only(&cli_args.db)?;
    let conn = store.connection();

    println!(
        "Top rated movie (at least {} ratings):",
        cli_args.min_movie_ratings
    );
    match top_rated_movie(conn, cli_args.min_movie_ratings)? {
        Some(movie) => println!("  {}", movie),
        None => println!("  none"),
    }

    println!(
        "\nTop {} genres (at least {} ratings):",
        TOP_GENRES_LIMIT, cli_args.min_genre_ratings
    );
    let genres = top_genres(conn, cli_args.min_genre_ratings, TOP_GENRES_LIMIT)?;
    if genres.is_empty() {
        println!("  none");
    }
    for (rank, genre) in genres.iter().enumerate() {
        println!("  {}. {}", rank + 1, genre);
    }

    println!("\nDirector with the most movies:");
    match most_prolific_director(conn)? {
        Some(director) => println!("  {}", director),
        None => println!("  none"),
    }

    println!("\nAverage rating by release year:");
    let years = average_rating_by_year(conn)?;
    if years.is_empty() {
        println!("  none");
    }
    for year in years {
        println!("  {}", year);
    }

    Ok(())
}
