mod models;
mod schema;
mod store;

pub use models::{LoadMode, Movie, TableCounts};
pub use store::{GenreId, RatingsInserted, SqliteMoviesStore};
