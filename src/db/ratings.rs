use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogId, MediaKind, NewRating, Rating, RatingFilter, RatingValue},
};

/// Message returned when a user rates the same item twice
pub const ALREADY_RATED: &str = "Already rated. Use PUT to update.";

/// Record store for user ratings
///
/// At most one rating exists per (user, catalog item, media kind); implementations
/// reject a second insert for the same triple with `AppError::InvalidInput`.
/// Listings come back oldest first so callers get a stable order.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingStore: Send + Sync {
    /// Lists ratings matching the filter, ordered by `rated_at` then `id`
    async fn list_ratings(&self, filter: &RatingFilter) -> AppResult<Vec<Rating>>;

    async fn find_rating(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<Rating>>;

    async fn insert_rating(&self, rating: NewRating) -> AppResult<Rating>;

    /// Changes the value of a rating owned by `user_id`; `None` if no such rating
    async fn update_rating_value(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        value: RatingValue,
    ) -> AppResult<Option<Rating>>;

    /// Removes a rating owned by `user_id`, returning whether anything was deleted
    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<bool>;
}
