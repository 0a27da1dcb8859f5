//! SQLite schema for the enriched movie database.
//!
//! Four tables: movies, their ratings, the genre dictionary and the
//! movie/genre junction. Reports query these tables directly.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const MOVIE_FK: ForeignKey = ForeignKey {
    foreign_table: "movies",
    foreign_column: "movie_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const GENRE_FK: ForeignKey = ForeignKey {
    foreign_table: "genres",
    foreign_column: "genre_id",
    on_delete: ForeignKeyOnChange::Cascade,
};

pub const MOVIES_TABLE: Table = Table {
    name: "movies",
    columns: &[
        sqlite_column!("movie_id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("release_year", &SqlType::Integer),
        sqlite_column!("decade", &SqlType::Text),
        sqlite_column!("director", &SqlType::Text),
        sqlite_column!("plot", &SqlType::Text),
        sqlite_column!("box_office", &SqlType::Text),
        sqlite_column!("imdb_id", &SqlType::Text),
    ],
    primary_key: &[],
    indices: &[],
    unique_constraints: &[],
};

pub const GENRES_TABLE: Table = Table {
    name: "genres",
    columns: &[
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        sqlite_column!("genre_name", &SqlType::Text, non_null = true),
    ],
    primary_key: &[],
    indices: &[],
    unique_constraints: &[&["genre_name"]],
};

pub const RATINGS_TABLE: Table = Table {
    name: "ratings",
    columns: &[
        sqlite_column!("user_id", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!("rating", &SqlType::Real, non_null = true),
        sqlite_column!("timestamp", &SqlType::Integer, non_null = true),
    ],
    primary_key: &[],
    indices: &[("idx_ratings_movie", "movie_id")],
    unique_constraints: &[],
};

pub const MOVIE_GENRES_TABLE: Table = Table {
    name: "movie_genres",
    columns: &[
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!(
            "genre_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&GENRE_FK)
        ),
    ],
    primary_key: &["movie_id", "genre_id"],
    indices: &[("idx_movie_genres_genre", "genre_id")],
    unique_constraints: &[],
};

/// Parents before children.
pub const MOVIES_SCHEMA: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[MOVIES_TABLE, GENRES_TABLE, RATINGS_TABLE, MOVIE_GENRES_TABLE],
};
