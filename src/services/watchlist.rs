use uuid::Uuid;

use crate::{
    db::{watchlist::ALREADY_IN_WATCHLIST, WatchlistStore},
    error::{AppError, AppResult},
    models::{NewWatchlistItem, WatchlistItem},
};

pub async fn list_watchlist(store: &dyn WatchlistStore, user_id: Uuid) -> AppResult<Vec<WatchlistItem>> {
    store.list_watchlist(user_id).await
}

/// Saves a title for later; saving the same title twice is rejected
pub async fn add_to_watchlist(
    store: &dyn WatchlistStore,
    item: NewWatchlistItem,
) -> AppResult<WatchlistItem> {
    if item.tmdb_id <= 0 {
        return Err(AppError::InvalidInput(
            "tmdb_id must be a positive catalog id".to_string(),
        ));
    }

    if store
        .find_watchlist_item(item.user_id, item.tmdb_id, item.media_type)
        .await?
        .is_some()
    {
        return Err(AppError::InvalidInput(ALREADY_IN_WATCHLIST.to_string()));
    }

    let saved = store.insert_watchlist_item(item).await?;

    tracing::info!(
        user_id = %saved.user_id,
        tmdb_id = saved.tmdb_id,
        media_type = %saved.media_type,
        "Watchlist item added"
    );

    Ok(saved)
}

pub async fn remove_from_watchlist(
    store: &dyn WatchlistStore,
    user_id: Uuid,
    item_id: Uuid,
) -> AppResult<()> {
    if !store.delete_watchlist_item(user_id, item_id).await? {
        return Err(AppError::NotFound("Item not found".to_string()));
    }

    tracing::info!(user_id = %user_id, item_id = %item_id, "Watchlist item removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{watchlist::MockWatchlistStore, InMemoryWatchlistStore},
        models::MediaKind,
    };

    fn entry(user_id: Uuid, tmdb_id: i64) -> NewWatchlistItem {
        NewWatchlistItem {
            user_id,
            tmdb_id,
            media_type: MediaKind::Movie,
        }
    }

    #[tokio::test]
    async fn test_add_rejects_title_already_saved() {
        let store = InMemoryWatchlistStore::new();
        let user = Uuid::new_v4();

        add_to_watchlist(&store, entry(user, 27205)).await.unwrap();
        let err = add_to_watchlist(&store, entry(user, 27205))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == ALREADY_IN_WATCHLIST));
        assert_eq!(list_watchlist(&store, user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_non_positive_id_without_touching_store() {
        let mut store = MockWatchlistStore::new();
        store.expect_find_watchlist_item().never();
        store.expect_insert_watchlist_item().never();

        let result = add_to_watchlist(&store, entry(Uuid::new_v4(), -4)).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_remove_unknown_item_is_not_found() {
        let store = InMemoryWatchlistStore::new();

        let result = remove_from_watchlist(&store, Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(ref msg)) if msg == "Item not found"));
    }
}
