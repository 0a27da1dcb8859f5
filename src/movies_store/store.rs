//! SQLite-backed store for enriched movies.

use super::models::{LoadMode, Movie, TableCounts};
use super::schema::{
    GENRES_TABLE, MOVIES_SCHEMA, MOVIES_TABLE, MOVIE_GENRES_TABLE, RATINGS_TABLE,
};
use crate::tabular::{MovieId, RatingRow};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

pub type GenreId = i64;

/// Outcome of a ratings insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingsInserted {
    pub inserted: usize,
    /// Rows rejected by a constraint, typically a movie id that is not in
    /// the `movies` table.
    pub skipped: usize,
}

pub struct SqliteMoviesStore {
    conn: Connection,
}

impl SqliteMoviesStore {
    /// Open (or create) the database file at `db_path`. The schema is not
    /// touched until [`SqliteMoviesStore::prepare_schema`] is called.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open movies database {:?}", db_path))?;
        Self::from_connection(conn)
    }

    /// Open an existing database for reporting. Fails if the file is
    /// missing or was not produced by this loader.
    pub fn open_read_only<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open movies database {:?}", db_path))?;
        MOVIES_SCHEMA
            .validate(&conn)
            .with_context(|| format!("{:?} is not a movies database", db_path))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Bring the schema in line with `mode`: destructive runs drop every
    /// table first, additive runs only create what is missing. Either way
    /// the result is validated against the expected layout.
    pub fn prepare_schema(&self, mode: LoadMode) -> Result<()> {
        if mode == LoadMode::Destructive {
            info!("Dropping existing tables");
            MOVIES_SCHEMA.drop(&self.conn)?;
        }
        MOVIES_SCHEMA
            .create(&self.conn)
            .context("Failed to create movies schema")?;
        MOVIES_SCHEMA
            .validate(&self.conn)
            .context("Movies database does not match the expected schema")?;
        Ok(())
    }

    /// Insert movies in a single transaction. Destructive runs replace a
    /// row with the same id, additive runs keep the existing one. Returns
    /// the number of rows written.
    pub fn insert_movies(&mut self, movies: &[Movie], mode: LoadMode) -> Result<usize> {
        let verb = match mode {
            LoadMode::Destructive => "INSERT OR REPLACE",
            LoadMode::Additive => "INSERT OR IGNORE",
        };
        let sql = format!(
            "{} INTO {} (movie_id, title, release_year, decade, director, plot, box_office, imdb_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            verb, MOVIES_TABLE.name
        );

        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for movie in movies {
                written += stmt
                    .execute(params![
                        movie.movie_id,
                        movie.title,
                        movie.release_year,
                        movie.decade,
                        movie.director,
                        movie.plot,
                        movie.box_office,
                        movie.imdb_id,
                    ])
                    .with_context(|| format!("Could not insert movie {}", movie.movie_id))?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Make sure every name in `names` has a genre row and return the id of
    /// each. Names already present keep their id.
    pub fn ensure_genres(&mut self, names: &BTreeSet<String>) -> Result<HashMap<String, GenreId>> {
        let tx = self.conn.transaction()?;
        let mut ids = HashMap::with_capacity(names.len());
        let mut created = 0usize;
        {
            let mut insert = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {} (genre_name) VALUES (?1)",
                GENRES_TABLE.name
            ))?;
            let mut select = tx.prepare(&format!(
                "SELECT genre_id FROM {} WHERE genre_name = ?1",
                GENRES_TABLE.name
            ))?;
            for name in names {
                created += insert.execute(params![name])?;
                let id: GenreId = select
                    .query_row(params![name], |row| row.get(0))
                    .with_context(|| format!("Genre {:?} missing after insert", name))?;
                ids.insert(name.clone(), id);
            }
        }
        tx.commit()?;
        debug!("{} genres created, {} already present", created, names.len() - created);
        Ok(ids)
    }

    /// Insert movie/genre pairs, ignoring pairs that already exist. Returns
    /// the number of new pairs.
    pub fn link_movie_genres(&mut self, pairs: &[(MovieId, GenreId)]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut linked = 0;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT OR IGNORE INTO {} (movie_id, genre_id) VALUES (?1, ?2)",
                MOVIE_GENRES_TABLE.name
            ))?;
            for (movie_id, genre_id) in pairs {
                linked += stmt
                    .execute(params![movie_id, genre_id])
                    .with_context(|| {
                        format!("Could not link movie {} to genre {}", movie_id, genre_id)
                    })?;
            }
        }
        tx.commit()?;
        Ok(linked)
    }

    pub fn insert_ratings(&mut self, ratings: &[RatingRow]) -> Result<RatingsInserted> {
        let tx = self.conn.transaction()?;
        let mut result = RatingsInserted::default();
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (user_id, movie_id, rating, timestamp) VALUES (?1, ?2, ?3, ?4)",
                RATINGS_TABLE.name
            ))?;
            for rating in ratings {
                match stmt.execute(params![
                    rating.user_id,
                    rating.movie_id,
                    rating.rating,
                    rating.timestamp
                ]) {
                    Ok(_) => result.inserted += 1,
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        warn!(
                            "Skipping rating by user {} for unknown movie {}",
                            rating.user_id, rating.movie_id
                        );
                        result.skipped += 1;
                    }
                    Err(e) => return Err(e).context("Could not insert rating"),
                }
            }
        }
        tx.commit()?;
        Ok(result)
    }

    pub fn get_counts(&self) -> Result<TableCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))?;
            Ok(n as usize)
        };
        Ok(TableCounts {
            movies: count(MOVIES_TABLE.name)?,
            ratings: count(RATINGS_TABLE.name)?,
            genres: count(GENRES_TABLE.name)?,
            movie_genres: count(MOVIE_GENRES_TABLE.name)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(movie_id: MovieId, title: &str) -> Movie {
        Movie {
            movie_id,
            title: title.to_string(),
            release_year: Some(1995),
            decade: Some("1990s".to_string()),
            genres: vec![],
            director: None,
            plot: None,
            box_office: None,
            imdb_id: None,
        }
    }

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn prepared(mode: LoadMode) -> SqliteMoviesStore {
        let store = SqliteMoviesStore::open_in_memory().unwrap();
        store.prepare_schema(mode).unwrap();
        store
    }

    #[test]
    fn prepare_schema_creates_all_tables() {
        let store = prepared(LoadMode::Additive);
        assert_eq!(store.get_counts().unwrap(), TableCounts::default());
    }

    #[test]
    fn destructive_prepare_clears_previous_rows() {
        let mut store = prepared(LoadMode::Destructive);
        store
            .insert_movies(&[movie(1, "Toy Story")], LoadMode::Destructive)
            .unwrap();

        store.prepare_schema(LoadMode::Destructive).unwrap();
        assert_eq!(store.get_counts().unwrap().movies, 0);
    }

    #[test]
    fn additive_prepare_keeps_previous_rows() {
        let mut store = prepared(LoadMode::Additive);
        store
            .insert_movies(&[movie(1, "Toy Story")], LoadMode::Additive)
            .unwrap();

        store.prepare_schema(LoadMode::Additive).unwrap();
        assert_eq!(store.get_counts().unwrap().movies, 1);
    }

    #[test]
    fn destructive_insert_replaces_and_additive_keeps() {
        let mut store = prepared(LoadMode::Destructive);
        store
            .insert_movies(&[movie(1, "Old")], LoadMode::Destructive)
            .unwrap();
        store
            .insert_movies(&[movie(1, "New")], LoadMode::Destructive)
            .unwrap();
        let title: String = store
            .connection()
            .query_row("SELECT title FROM movies WHERE movie_id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(title, "New");

        let written = store
            .insert_movies(&[movie(1, "Ignored")], LoadMode::Additive)
            .unwrap();
        assert_eq!(written, 0);
        let title: String = store
            .connection()
            .query_row("SELECT title FROM movies WHERE movie_id = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(title, "New");
    }

    #[test]
    fn ensure_genres_is_stable_across_calls() {
        let mut store = prepared(LoadMode::Destructive);
        let first = store.ensure_genres(&names(&["Comedy", "Drama"])).unwrap();
        let second = store.ensure_genres(&names(&["Drama", "Horror"])).unwrap();

        assert_eq!(first["Drama"], second["Drama"]);
        assert_ne!(second["Drama"], second["Horror"]);
        assert_eq!(store.get_counts().unwrap().genres, 3);
    }

    #[test]
    fn link_movie_genres_ignores_duplicates() {
        let mut store = prepared(LoadMode::Destructive);
        store
            .insert_movies(&[movie(1, "Toy Story")], LoadMode::Destructive)
            .unwrap();
        let ids = store.ensure_genres(&names(&["Animation"])).unwrap();
        let pair = (1, ids["Animation"]);

        assert_eq!(store.link_movie_genres(&[pair, pair]).unwrap(), 1);
        assert_eq!(store.link_movie_genres(&[pair]).unwrap(), 0);
        assert_eq!(store.get_counts().unwrap().movie_genres, 1);
    }

    #[test]
    fn ratings_for_unknown_movies_are_skipped() {
        let mut store = prepared(LoadMode::Destructive);
        store
            .insert_movies(&[movie(1, "Toy Story")], LoadMode::Destructive)
            .unwrap();

        let result = store
            .insert_ratings(&[
                RatingRow {
                    user_id: 10,
                    movie_id: 1,
                    rating: 4.5,
                    timestamp: 964982703,
                },
                RatingRow {
                    user_id: 10,
                    movie_id: 99,
                    rating: 2.0,
                    timestamp: 964982704,
                },
            ])
            .unwrap();

        assert_eq!(
            result,
            RatingsInserted {
                inserted: 1,
                skipped: 1
            }
        );
        assert_eq!(store.get_counts().unwrap().ratings, 1);
    }

    #[test]
    fn opens_database_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("movies.db");
        {
            let mut store = SqliteMoviesStore::new(&db_path).unwrap();
            store.prepare_schema(LoadMode::Destructive).unwrap();
            store
                .insert_movies(&[movie(1, "Toy Story")], LoadMode::Destructive)
                .unwrap();
        }

        let store = SqliteMoviesStore::new(&db_path).unwrap();
        assert_eq!(store.get_counts().unwrap().movies, 1);
    }

    #[test]
    fn read_only_open_requires_movies_schema() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("movies.db");
        {
            let store = SqliteMoviesStore::new(&db_path).unwrap();
            store.prepare_schema(LoadMode::Destructive).unwrap();
        }
        let store = SqliteMoviesStore::open_read_only(&db_path).unwrap();
        assert_eq!(store.get_counts().unwrap(), TableCounts::default());

        let other_path = temp_dir.path().join("other.db");
        Connection::open(&other_path)
            .unwrap()
            .execute("CREATE TABLE unrelated (id INTEGER)", [])
            .unwrap();
        assert!(SqliteMoviesStore::open_read_only(&other_path).is_err());
        assert!(SqliteMoviesStore::open_read_only(temp_dir.path().join("missing.db")).is_err());
    }
}
