use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::VerifiedUser,
    models::{CatalogId, MediaKind, NewWatchlistItem, WatchlistItem},
    routes::{
        extract::{ApiJson, ApiPath},
        AppState,
    },
    services::watchlist,
};

#[derive(Debug, Deserialize)]
pub struct WatchlistCreate {
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    VerifiedUser(user_id): VerifiedUser,
) -> AppResult<Json<Vec<WatchlistItem>>> {
    let items = watchlist::list_watchlist(state.watchlist.as_ref(), user_id).await?;
    Ok(Json(items))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    VerifiedUser(user_id): VerifiedUser,
    ApiJson(request): ApiJson<WatchlistCreate>,
) -> AppResult<(StatusCode, Json<WatchlistItem>)> {
    let item = watchlist::add_to_watchlist(
        state.watchlist.as_ref(),
        NewWatchlistItem {
            user_id,
            tmdb_id: request.tmdb_id,
            media_type: request.media_type,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    VerifiedUser(user_id): VerifiedUser,
    ApiPath(item_id): ApiPath<Uuid>,
) -> AppResult<Json<Value>> {
    watchlist::remove_from_watchlist(state.watchlist.as_ref(), user_id, item_id).await?;
    Ok(Json(json!({ "message": "Removed from watchlist" })))
}
