pub mod memory;
pub mod postgres;
pub mod ratings;
pub mod redis;
pub mod watchlist;

pub use memory::{InMemoryRatingStore, InMemoryWatchlistStore};
pub use postgres::{create_pool, PgRatingStore, PgWatchlistStore};
pub use ratings::RatingStore;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use watchlist::WatchlistStore;
