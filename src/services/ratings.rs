use uuid::Uuid;

use crate::{
    db::{ratings::ALREADY_RATED, RatingStore},
    error::{AppError, AppResult},
    models::{MediaKind, NewRating, Rating, RatingFilter, RatingValue},
};

/// Lists a user's ratings, optionally for one media kind only
pub async fn list_ratings(
    store: &dyn RatingStore,
    user_id: Uuid,
    media_type: Option<MediaKind>,
) -> AppResult<Vec<Rating>> {
    let mut filter = RatingFilter::for_user(user_id);
    filter.media_kind = media_type;
    store.list_ratings(&filter).await
}

/// Records a first rating for a title
///
/// Re-rating goes through [`update_rating`]; a second create for the same title
/// and media kind is rejected.
pub async fn create_rating(store: &dyn RatingStore, rating: NewRating) -> AppResult<Rating> {
    if rating.tmdb_id <= 0 {
        return Err(AppError::InvalidInput(
            "tmdb_id must be a positive catalog id".to_string(),
        ));
    }

    if store
        .find_rating(rating.user_id, rating.tmdb_id, rating.media_type)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput(ALREADY_RATED.to_string()));
    }

    let created = store.insert_rating(rating).await?;

    tracing::info!(
        user_id = %created.user_id,
        tmdb_id = created.tmdb_id,
        media_type = %created.media_type,
        rating = ?created.rating,
        "Rating created"
    );

    Ok(created)
}

pub async fn update_rating(
    store: &dyn RatingStore,
    user_id: Uuid,
    rating_id: Uuid,
    value: RatingValue,
) -> AppResult<Rating> {
    store
        .update_rating_value(user_id, rating_id, value)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))
}

pub async fn delete_rating(store: &dyn RatingStore, user_id: Uuid, rating_id: Uuid) -> AppResult<()> {
    if !store.delete_rating(user_id, rating_id).await? {
        return Err(AppError::NotFound("Rating not found".to_string()));
    }

    tracing::info!(user_id = %user_id, rating_id = %rating_id, "Rating deleted");
    Ok(())
}
