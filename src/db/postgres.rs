use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
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

const RATING_COLUMNS: &str = "id, user_id, tmdb_id, media_type, rating, rated_at, updated_at";
const WATCHLIST_COLUMNS: &str = "id, user_id, tmdb_id, media_type, added_at";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    user_id: Uuid,
    tmdb_id: i32,
    media_type: MediaKind,
    rating: RatingValue,
    rated_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            user_id: row.user_id,
            tmdb_id: CatalogId::from(row.tmdb_id),
            media_type: row.media_type,
            rating: row.rating,
            rated_at: row.rated_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WatchlistRow {
    id: Uuid,
    user_id: Uuid,
    tmdb_id: i32,
    media_type: MediaKind,
    added_at: DateTime<Utc>,
}

impl From<WatchlistRow> for WatchlistItem {
    fn from(row: WatchlistRow) -> Self {
        WatchlistItem {
            id: row.id,
            user_id: row.user_id,
            tmdb_id: CatalogId::from(row.tmdb_id),
            media_type: row.media_type,
            added_at: row.added_at,
        }
    }
}

/// Maps a unique-constraint violation to the given duplicate message
fn duplicate_or_database(e: sqlx::Error, duplicate: &str) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::InvalidInput(duplicate.to_string())
        }
        _ => AppError::Database(e),
    }
}

/// The `ratings` and `watchlist` tables store catalog ids as INT4
fn to_column_id(tmdb_id: CatalogId) -> AppResult<i32> {
    i32::try_from(tmdb_id)
        .map_err(|_| AppError::InvalidInput(format!("Catalog id {} is out of range", tmdb_id)))
}

/// Rating store backed by the `ratings` table
#[derive(Clone)]
pub struct PgRatingStore {
    pool: PgPool,
}

impl PgRatingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RatingStore for PgRatingStore {
    async fn list_ratings(&self, filter: &RatingFilter) -> AppResult<Vec<Rating>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(RATING_COLUMNS);
        query.push(" FROM ratings WHERE user_id = ");
        query.push_bind(filter.user_id);

        if let Some(kind) = filter.media_kind {
            query.push(" AND media_type = ");
            query.push_bind(kind);
        }

        if let Some(values) = &filter.values {
            if values.is_empty() {
                return Ok(Vec::new());
            }
            query.push(" AND rating IN (");
            let mut separated = query.separated(", ");
            for value in values {
                separated.push_bind(*value);
            }
            separated.push_unseparated(")");
        }

        query.push(" ORDER BY rated_at ASC, id ASC");

        let rows: Vec<RatingRow> = query.build_query_as().fetch_all(&self.pool).await?;

        tracing::debug!(
            user_id = %filter.user_id,
            media_kind = ?filter.media_kind,
            count = rows.len(),
            "Ratings loaded"
        );

        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn find_rating(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<Rating>> {
        let sql = format!(
            "SELECT {} FROM ratings WHERE user_id = $1 AND tmdb_id = $2 AND media_type = $3",
            RATING_COLUMNS
        );

        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(to_column_id(tmdb_id)?)
            .bind(media_type)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Rating::from))
    }

    async fn insert_rating(&self, rating: NewRating) -> AppResult<Rating> {
        let sql = format!(
            "INSERT INTO ratings (id, user_id, tmdb_id, media_type, rating) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            RATING_COLUMNS
        );

        let row: RatingRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(rating.user_id)
            .bind(to_column_id(rating.tmdb_id)?)
            .bind(rating.media_type)
            .bind(rating.rating)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or_database(e, ALREADY_RATED))?;

        Ok(row.into())
    }

    async fn update_rating_value(
        &self,
        user_id: Uuid,
        rating_id: Uuid,
        value: RatingValue,
    ) -> AppResult<Option<Rating>> {
        let sql = format!(
            "UPDATE ratings SET rating = $1, updated_at = now() \
             WHERE id = $2 AND user_id = $3 RETURNING {}",
            RATING_COLUMNS
        );

        let row: Option<RatingRow> = sqlx::query_as(&sql)
            .bind(value)
            .bind(rating_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Rating::from))
    }

    async fn delete_rating(&self, user_id: Uuid, rating_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1 AND user_id = $2")
            .bind(rating_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Watchlist store backed by the `watchlist` table
#[derive(Clone)]
pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn list_watchlist(&self, user_id: Uuid) -> AppResult<Vec<WatchlistItem>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE user_id = $1 ORDER BY added_at ASC, id ASC",
            WATCHLIST_COLUMNS
        );

        let rows: Vec<WatchlistRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(WatchlistItem::from).collect())
    }

    async fn find_watchlist_item(
        &self,
        user_id: Uuid,
        tmdb_id: CatalogId,
        media_type: MediaKind,
    ) -> AppResult<Option<WatchlistItem>> {
        let sql = format!(
            "SELECT {} FROM watchlist WHERE user_id = $1 AND tmdb_id = $2 AND media_type = $3",
            WATCHLIST_COLUMNS
        );

        let row: Option<WatchlistRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(to_column_id(tmdb_id)?)
            .bind(media_type)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(WatchlistItem::from))
    }

    async fn insert_watchlist_item(&self, item: NewWatchlistItem) -> AppResult<WatchlistItem> {
        let sql = format!(
            "INSERT INTO watchlist (id, user_id, tmdb_id, media_type) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            WATCHLIST_COLUMNS
        );

        let row: WatchlistRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(item.user_id)
            .bind(to_column_id(item.tmdb_id)?)
            .bind(item.media_type)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| duplicate_or_database(e, ALREADY_IN_WATCHLIST))?;

        Ok(row.into())
    }

    async fn delete_watchlist_item(&self, user_id: Uuid, item_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM watchlist WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
