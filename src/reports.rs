//! Fixed aggregate queries over the movies database.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::fmt;

pub const DEFAULT_MIN_MOVIE_RATINGS: i64 = 50;
pub const DEFAULT_MIN_GENRE_RATINGS: i64 = 5;
pub const TOP_GENRES_LIMIT: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct RatedMovie {
    pub title: String,
    pub avg_rating: f64,
    pub num_ratings: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatedGenre {
    pub genre_name: String,
    pub avg_rating: f64,
    pub num_ratings: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorCredits {
    pub director: String,
    pub movie_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearRating {
    pub year: i32,
    pub avg_rating: f64,
    pub num_ratings: i64,
}

impl fmt::Display for RatedMovie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (avg {:.2} over {} ratings)",
            self.title, self.avg_rating, self.num_ratings
        )
    }
}

impl fmt::Display for RatedGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (avg {:.2} over {} ratings)",
            self.genre_name, self.avg_rating, self.num_ratings
        )
    }
}

impl fmt::Display for DirectorCredits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} movies)", self.director, self.movie_count)
    }
}

impl fmt::Display for YearRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: avg {:.2} over {} ratings",
            self.year, self.avg_rating, self.num_ratings
        )
    }
}

/// Movie with the highest average rating among those rated at least
/// `min_ratings` times. Ties go to the movie with more ratings.
pub fn top_rated_movie(conn: &Connection, min_ratings: i64) -> Result<Option<RatedMovie>> {
    conn.query_row(
        "SELECT m.title, ROUND(AVG(r.rating), 2) AS avg_rating, COUNT(r.rating) AS num_ratings
         FROM movies m
         JOIN ratings r ON m.movie_id = r.movie_id
         GROUP BY m.movie_id
         HAVING COUNT(r.rating) >= ?1
         ORDER BY avg_rating DESC, num_ratings DESC
         LIMIT 1",
        params![min_ratings],
        |row| {
            Ok(RatedMovie {
                title: row.get(0)?,
                avg_rating: row.get(1)?,
                num_ratings: row.get(2)?,
            })
        },
    )
    .optional()
    .context("Top rated movie query failed")
}

pub fn top_genres(conn: &Connection, min_ratings: i64, limit: i64) -> Result<Vec<RatedGenre>> {
    let mut stmt = conn.prepare(
        "SELECT g.genre_name, ROUND(AVG(r.rating), 2) AS avg_rating, COUNT(r.rating) AS num_ratings
         FROM genres g
         JOIN movie_genres mg ON g.genre_id = mg.genre_id
         JOIN ratings r ON mg.movie_id = r.movie_id
         GROUP BY g.genre_id
         HAVING COUNT(r.rating) >= ?1
         ORDER BY avg_rating DESC, num_ratings DESC
         LIMIT ?2",
    )?;
    let genres = stmt
        .query_map(params![min_ratings, limit], |row| {
            Ok(RatedGenre {
                genre_name: row.get(0)?,
                avg_rating: row.get(1)?,
                num_ratings: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Top genres query failed")?;
    Ok(genres)
}

/// Director credited on the most movies. Blank directors are ignored.
pub fn most_prolific_director(conn: &Connection) -> Result<Option<DirectorCredits>> {
    conn.query_row(
        "SELECT director, COUNT(*) AS movie_count
         FROM movies
         WHERE director IS NOT NULL AND TRIM(director) <> ''
         GROUP BY director
         ORDER BY movie_count DESC, director ASC
         LIMIT 1",
        [],
        |row| {
            Ok(DirectorCredits {
                director: row.get(0)?,
                movie_count: row.get(1)?,
            })
        },
    )
    .optional()
    .context("Director query failed")
}

pub fn average_rating_by_year(conn: &Connection) -> Result<Vec<YearRating>> {
    let mut stmt = conn.prepare(
        "SELECT m.release_year, ROUND(AVG(r.rating), 2) AS avg_rating, COUNT(r.rating) AS num_ratings
         FROM movies m
         JOIN ratings r ON m.movie_id = r.movie_id
         WHERE m.release_year IS NOT NULL
         GROUP BY m.release_year
         ORDER BY m.release_year",
    )?;
    let years = stmt
        .query_map([], |row| {
            Ok(YearRating {
                year: row.get(0)?,
                avg_rating: row.get(1)?,
                num_ratings: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Yearly rating query failed")?;
    Ok(years)
}
