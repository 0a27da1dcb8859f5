//! Canned CSV inputs shared by the integration tests.

pub const MOVIES_HEADER: &str = "movieId,title,genres\n";
pub const RATINGS_HEADER: &str = "userId,movieId,rating,timestamp\n";

pub const TOY_STORY_ID: i64 = 1;
pub const JUMANJI_ID: i64 = 2;
pub const HEAT_ID: i64 = 6;

pub const SAMPLE_MOVIES: &str = "movieId,title,genres
1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy
2,Jumanji (1995),Adventure|Children|Fantasy
6,Heat (1995),Action|Crime|Thriller
3000,Untitled Project,(no genres listed)
";

pub const SAMPLE_RATINGS: &str = "userId,movieId,rating,timestamp
1,1,4.0,964982703
1,6,4.0,964982224
2,1,5.0,964983815
2,2,3.5,964983816
3,6,5.0,964984000
4,999,1.0,964984001
";

pub const SAMPLE_LINKS: &str = "movieId,imdbId,tmdbId
1,0114709,862
2,0113497,8844
6,0113277,949
3000,,
";
