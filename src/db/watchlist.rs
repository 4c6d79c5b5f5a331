use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogId, MediaKind, NewWatchlistItem, WatchlistItem},
};

/// Message returned when a title is saved twice
pub const ALREADY_IN_WATCHLIST: &str = "Already in watchlist";

/// Record store for saved titles
///
/// Like ratings, a title appears at most once per (user, catalog item, media kind).
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// A user's saved titles, oldest first
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistItem>>;

    async fn find_watchlist_item(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<WatchlistItem>>;

    async fn insert_watchlist_item(&self, item: NewWatchlistItem) -> AppResult<WatchlistItem>;

    /// Removes an entry owned by `user_id`, returning whether anything was deleted
    async fn delete_watchlist_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<bool>;
}
