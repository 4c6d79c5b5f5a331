use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{
        ratings::{RatingStore, ALREADY_RATED},
        watchlist::{WatchlistStore, ALREADY_IN_WATCHLIST},
    },
    error::{AppError, AppResult},
    models::{
        CatalogId, MediaKind, NewRating, NewWatchlistItem, Rating, RatingFilter, RatingValue,
        WatchlistItem,
    },
};

/// Rating store held entirely in process memory
///
/// Records are kept in insertion order, which doubles as `rated_at` order.
#[derive(Clone, Default)]
pub struct InMemoryRatingStore {
    inner: Arc<RwLock<Vec<Rating>>>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with existing records
    pub fn with_ratings(ratings: Vec<Rating>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ratings)),
        }
    }
}

#[async_trait::async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn list_ratings(&self, filter: &RatingFilter) -> AppResult<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn find_rating(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .iter()
            .find(|r| r.user_id == user_id && r.tmdb_id == tmdb_id && r.media_type == media_type)
            .cloned())
    }

    async fn insert_rating(&self, rating: NewRating) -> AppResult<Rating> {
        let mut inner = self.inner.write().await;

        let duplicate = inner.iter().any(|r| {
            r.user_id == rating.user_id
                && r.tmdb_id == rating.tmdb_id
                && r.media_type == rating.media_type
        });
        if duplicate {
            return Err(AppError::InvalidInput(ALREADY_RATED.to_string()));
        }

        let record = Rating {
            id: Uuid::new_v4(),
            user_id: rating.user_id,
            tmdb_id: rating.tmdb_id,
            media_type: rating.media_type,
            rating: rating.rating,
            rated_at: Utc::now(),
            updated_at: None,
        };
        inner.push(record.clone());

        Ok(record)
    }

    async fn update_rating_value(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        value: RatingValue,
    ) -> AppResult<Option<Rating>> {
        let mut inner = self.inner.write().await;

        Ok(inner
            .iter_mut()
            .find(|r| r.id == rating_id && r.user_id == user_id)
            .map(|r| {
                r.rating = value;
                r.updated_at = Some(Utc::now());
                r.clone()
            }))
    }

    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|r| !(r.id == rating_id && r.user_id == user_id));
        Ok(inner.len() < before)
    }
}

/// Watchlist held in process memory, in insertion order
#[derive(Clone, Default)]
pub struct InMemoryWatchlistStore {
    inner: Arc<RwLock<Vec<WatchlistItem>>>,
}

impl InMemoryWatchlistStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WatchlistStore for InMemoryWatchlistStore {
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .iter()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_watchlist_item(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<WatchlistItem>> {
        let wanted = NewWatchlistItem {
            user_id,
            tmdb_id,
            media_type,
        };
        let inner = self.inner.read().await;
        Ok(inner.iter().find(|item| item.same_title(&wanted)).cloned())
    }

    async fn insert_watchlist_item(&self, item: NewWatchlistItem) -> AppResult<WatchlistItem> {
        let mut inner = self.inner.write().await;

        if inner.iter().any(|existing| existing.same_title(&item)) {
            return Err(AppError::InvalidInput(ALREADY_IN_WATCHLIST.to_string()));
        }

        let record = WatchlistItem {
            id: Uuid::new_v4(),
            user_id: item.user_id,
            tmdb_id: item.tmdb_id,
            media_type: item.media_type,
            added_at: Utc::now(),
        };
        inner.push(record.clone());

        Ok(record)
    }

    async fn delete_watchlist_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|item| !(item.id == item_id && item.user_id == user_id));
        Ok(inner.len() < before)
    }
}
