use axum::{
    extract::State,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{CatalogId, DiscoverQuery, GenreList, MediaDetails, MediaKind, ResultPage, SortBy, TimeWindow},
    routes::{
        extract::{ApiPath, ApiQuery},
        recommendations, AppState,
    },
    services::catalog as catalog_service,
};

/// Browse and personalization routes for one media kind
///
/// Mounted once under `/movies` and once under `/tv`; handlers read the kind
/// from the request extensions.
pub fn media_routes(kind: MediaKind) -> Router<Arc<AppState>> {
    Router::new()
        .route("/trending", get(trending))
        .route("/popular", get(popular))
        .route("/search", get(search))
        .route("/discover", get(discover))
        .route("/personalized", get(recommendations::personalized))
        .route("/:id", get(details))
        .route("/:id/credits", get(credits))
        .route("/:id/videos", get(videos))
        .layer(Extension(kind))
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default)]
    time_window: TimeWindow,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscoverParams {
    /// Comma-separated genre ids, e.g. `28,12`
    genre: Option<String>,
    year: Option<i32>,
    language: Option<String>,
    region: Option<String>,
    sort_by: Option<SortBy>,
    page: Option<u32>,
    min_vote_count: Option<u32>,
    min_vote_average: Option<f64>,
}

impl DiscoverParams {
    fn into_query(self) -> AppResult<DiscoverQuery> {
        let genres = match self.genre.as_deref() {
            Some(raw) => catalog_service::parse_genre_list(raw)?,
            None => Vec::new(),
        };

        Ok(DiscoverQuery {
            genres,
            sort_by: self.sort_by.unwrap_or_default(),
            page: self.page.unwrap_or(1),
            min_vote_count: self.min_vote_count,
            min_vote_average: self.min_vote_average,
            year: self.year,
            language: self.language,
            region: self.region,
        })
    }
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiQuery(params): ApiQuery<TrendingQuery>,
) -> AppResult<Json<ResultPage>> {
    let page = state.catalog.trending(kind, params.time_window).await?;
    Ok(Json(page))
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
) -> AppResult<Json<ResultPage>> {
    let page = state.catalog.popular(kind).await?;
    Ok(Json(page))
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> AppResult<Json<ResultPage>> {
    let page = catalog_service::search_titles(state.catalog.clone(), kind, &params.query).await?;
    Ok(Json(page))
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiQuery(params): ApiQuery<DiscoverParams>,
) -> AppResult<Json<ResultPage>> {
    let query = params.into_query()?;
    let page = catalog_service::discover_titles(state.catalog.clone(), kind, query).await?;
    Ok(Json(page))
}

pub async fn details(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiPath(id): ApiPath<CatalogId>,
) -> AppResult<Json<MediaDetails>> {
    let details = state.catalog.details(kind, id).await?;
    Ok(Json(details))
}

pub async fn credits(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiPath(id): ApiPath<CatalogId>,
) -> AppResult<Json<serde_json::Value>> {
    let credits = state.catalog.credits(kind, id).await?;
    Ok(Json(credits))
}

pub async fn videos(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    ApiPath(id): ApiPath<CatalogId>,
) -> AppResult<Json<serde_json::Value>> {
    let videos = state.catalog.videos(kind, id).await?;
    Ok(Json(videos))
}

pub async fn genres(
    State(state): State<Arc<AppState>>,
    ApiPath(media_type): ApiPath<MediaKind>,
) -> AppResult<Json<GenreList>> {
    let genres = state.catalog.genres(media_type).await?;
    Ok(Json(genres))
}
