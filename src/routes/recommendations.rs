use axum::{
    extract::State,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{RequestId, VerifiedUser},
    models::{MediaKind, ResultPage},
    routes::{extract::ApiQuery, AppState},
    services::recommendations::{self, PersonalizedRequest},
};

/// Handler for the personalized feed of movies or series
pub async fn personalized(
    State(state): State<Arc<AppState>>,
    Extension(kind): Extension<MediaKind>,
    Extension(request_id): Extension<RequestId>,
    VerifiedUser(user_id): VerifiedUser,
    ApiQuery(request): ApiQuery<PersonalizedRequest>,
) -> AppResult<Json<ResultPage>> {
    tracing::info!(
        request_id = %request_id,
        user_id = %user_id,
        media_kind = %kind,
        page = request.page,
        "Processing personalized request"
    );

    let page = recommendations::personalized_results(
        state.ratings.as_ref(),
        state.catalog.clone(),
        user_id,
        kind,
        request,
    )
    .await?;

    Ok(Json(page))
}
