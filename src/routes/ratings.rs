use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::AuthenticatedUser,
    models::{CatalogId, MediaKind, NewRating, Rating, RatingValue},
    routes::{
        extract::{ApiJson, ApiPath, ApiQuery},
        AppState,
    },
    services::ratings,
};

#[derive(Debug, Deserialize)]
pub struct RatingCreate {
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
    pub rating: RatingValue,
}

#[derive(Debug, Deserialize)]
pub struct RatingUpdate {
    pub rating: RatingValue,
}

#[derive(Debug, Deserialize)]
pub struct RatingListQuery {
    pub media_type: Option<MediaKind>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiQuery(params): ApiQuery<RatingListQuery>,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = ratings::list_ratings(state.ratings.as_ref(), user.id, params.media_type).await?;
    Ok(Json(ratings))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiJson(request): ApiJson<RatingCreate>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = ratings::create_rating(
        state.ratings.as_ref(),
        NewRating {
            user_id: user.id,
            tmdb_id: request.tmdb_id,
            media_type: request.media_type,
            rating: request.rating,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiPath(rating_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<RatingUpdate>,
) -> AppResult<Json<Rating>> {
    let rating =
        ratings::update_rating(state.ratings.as_ref(), user.id, rating_id, request.rating).await?;
    Ok(Json(rating))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    ApiPath(rating_id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    ratings::delete_rating(state.ratings.as_ref(), user.id, rating_id).await?;
    Ok(Json(json!({ "message": "Rating deleted" })))
}
