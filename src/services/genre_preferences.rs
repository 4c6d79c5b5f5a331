use std::collections::HashMap;
use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use uuid::Uuid;

use crate::{
    db::RatingStore,
    error::{AppError, AppResult},
    models::{GenreId, MediaDetails, MediaKind, RatingFilter, RatingValue},
    services::providers::CatalogProvider,
};

/// Upper bound on catalog detail requests in flight for one analysis
pub const MAX_CONCURRENT_DETAIL_LOOKUPS: usize = 8;

/// Derives a user's favorite genres for one media kind
///
/// Only `go_for_it` and `perfection` ratings count. Each rated title's genres are
/// looked up in the catalog and tallied, a `perfection` counting twice. Genres come
/// back heaviest first; equal weights keep the order they were first seen in.
/// A user without favorable ratings gets an empty list.
///
/// Detail lookups run concurrently, one task per favorable rating with at most
/// [`MAX_CONCURRENT_DETAIL_LOOKUPS`] requests in flight. The first failure aborts
/// the remaining lookups and fails the whole analysis.
pub async fn favorite_genres(
    store: &dyn RatingStore,
    catalog: Arc<dyn CatalogProvider>,
    user_id: Uuid,
    kind: MediaKind,
) -> AppResult<Vec<GenreId>> {
    let filter = RatingFilter::for_user(user_id)
        .media_kind(kind)
        .values(&RatingValue::FAVORABLE);
    let ratings = store.list_ratings(&filter).await?;

    if ratings.is_empty() {
        return Ok(Vec::new());
    }

    let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_DETAIL_LOOKUPS));
    let mut lookups = JoinSet::new();
    for (index, rating) in ratings.iter().enumerate() {
        let catalog = Arc::clone(&catalog);
        let permits = Arc::clone(&permits);
        let id = rating.tmdb_id;
        lookups.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => catalog.details(kind, id).await,
                Err(e) => Err(AppError::Internal(e.to_string())),
            };
            (index, result)
        });
    }

    let mut details: Vec<Option<MediaDetails>> = vec![None; ratings.len()];
    while let Some(joined) = lookups.join_next().await {
        let (index, result) = joined.map_err(|e| AppError::Internal(e.to_string()))?;
        details[index] = Some(result?);
    }

    // Weights are applied in rating order so first-seen ties stay deterministic
    let weighted = ratings.iter().zip(details).map(|(rating, details)| {
        let genres = details.map(|d| d.genre_ids()).unwrap_or_default();
        (genres, rating.rating.genre_weight())
    });
    let ranked = rank_genres(weighted);

    tracing::debug!(
        user_id = %user_id,
        media_kind = %kind,
        favorable_ratings = ratings.len(),
        genres = ?ranked,
        "Favorite genres computed"
    );

    Ok(ranked)
}

/// Orders genres by descending total weight
///
/// Each input pairs one title's genre list with the weight its rating carries.
/// The sort is stable over first appearance, so ties are never reshuffled.
pub fn rank_genres<I>(weighted: I) -> Vec<GenreId>
where
    I: IntoIterator<Item = (Vec<GenreId>, usize)>,
{
    let mut tally: Vec<(GenreId, usize)> = Vec::new();
    let mut slots: HashMap<GenreId, usize> = HashMap::new();

    for (genres, weight) in weighted {
        if weight == 0 {
            continue;
        }
        for genre in genres {
            let slot = *slots.entry(genre).or_insert_with(|| {
                tally.push((genre, 0));
                tally.len() - 1
            });
            tally[slot].1 += weight;
        }
    }

    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.into_iter().map(|(genre, _)| genre).collect()
}
