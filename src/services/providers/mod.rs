/// Media catalog provider abstraction
///
/// The recommendation engine and the browse endpoints only talk to the catalog
/// through this trait, so the provider (and its cache) can be swapped or faked.
use crate::{
    error::AppResult,
    models::{CatalogId, DiscoverQuery, GenreList, MediaDetails, MediaKind, ResultPage, TimeWindow},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for external movie/TV catalog providers
///
/// Implementations own their caching and timeout policy; callers see only
/// results or errors and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Runs a filtered discovery query and returns one page of results
    async fn discover(&self, kind: MediaKind, query: &DiscoverQuery) -> AppResult<ResultPage>;

    /// Fetches the full record for one title, including its genres
    async fn details(&self, kind: MediaKind, id: CatalogId) -> AppResult<MediaDetails>;

    async fn trending(&self, kind: MediaKind, window: TimeWindow) -> AppResult<ResultPage>;

    async fn popular(&self, kind: MediaKind) -> AppResult<ResultPage>;

    /// Free-text title search; blank queries are rejected
    async fn search(&self, kind: MediaKind, query: &str) -> AppResult<ResultPage>;

    async fn credits(&self, kind: MediaKind, id: CatalogId) -> AppResult<serde_json::Value>;

    async fn videos(&self, kind: MediaKind, id: CatalogId) -> AppResult<serde_json::Value>;

    /// Genre id/name table for a media kind
    async fn genres(&self, kind: MediaKind) -> AppResult<GenreList>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
