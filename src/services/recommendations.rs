use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::RatingStore,
    error::{AppError, AppResult},
    models::{CatalogId, DiscoverQuery, GenreId, MediaKind, RatingFilter, ResultPage, SortBy},
    services::{genre_preferences::favorite_genres, providers::CatalogProvider},
};

/// Users with fewer ratings than this get the generic popular feed
pub const COLD_START_THRESHOLD: usize = 5;
/// Users with at least this many ratings get the strictest personalization
pub const RICH_HISTORY_THRESHOLD: usize = 20;
pub const LIGHT_HISTORY_GENRE_LIMIT: usize = 2;
pub const RICH_HISTORY_GENRE_LIMIT: usize = 3;
/// Quality floor applied to rich-history users regardless of what they ask for
pub const RICH_HISTORY_MIN_VOTE_AVERAGE: f64 = 7.0;

pub const DEFAULT_MIN_VOTE_COUNT: u32 = 500;
pub const DEFAULT_MIN_VOTE_AVERAGE: f64 = 6.5;
/// Deepest page the catalog provider serves
pub const MAX_PAGE: u32 = 500;

/// Personalization strategy, chosen by how many titles of a kind a user has rated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalizationTier {
    ColdStart,
    LightHistory,
    RichHistory,
}

impl PersonalizationTier {
    pub fn for_rating_count(count: usize) -> Self {
        if count < COLD_START_THRESHOLD {
            PersonalizationTier::ColdStart
        } else if count < RICH_HISTORY_THRESHOLD {
            PersonalizationTier::LightHistory
        } else {
            PersonalizationTier::RichHistory
        }
    }

    /// How many favorite genres the discovery query is restricted to
    pub fn genre_limit(&self) -> usize {
        match self {
            PersonalizationTier::ColdStart => 0,
            PersonalizationTier::LightHistory => LIGHT_HISTORY_GENRE_LIMIT,
            PersonalizationTier::RichHistory => RICH_HISTORY_GENRE_LIMIT,
        }
    }
}

impl Display for PersonalizationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersonalizationTier::ColdStart => write!(f, "cold_start"),
            PersonalizationTier::LightHistory => write!(f, "light_history"),
            PersonalizationTier::RichHistory => write!(f, "rich_history"),
        }
    }
}

/// Caller-supplied paging and quality bounds for a personalized feed
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct PersonalizedRequest {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_min_vote_count", alias = "minVoteCount")]
    pub min_vote_count: u32,
    #[serde(default = "default_min_vote_average", alias = "minVoteAverage")]
    pub min_vote_average: f64,
}

fn default_page() -> u32 {
    1
}

fn default_min_vote_count() -> u32 {
    DEFAULT_MIN_VOTE_COUNT
}

fn default_min_vote_average() -> f64 {
    DEFAULT_MIN_VOTE_AVERAGE
}

impl Default for PersonalizedRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            min_vote_count: DEFAULT_MIN_VOTE_COUNT,
            min_vote_average: DEFAULT_MIN_VOTE_AVERAGE,
        }
    }
}

impl PersonalizedRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.page == 0 || self.page > MAX_PAGE {
            return Err(AppError::InvalidInput(format!(
                "page must be between 1 and {}",
                MAX_PAGE
            )));
        }

        if !(0.0..=10.0).contains(&self.min_vote_average) {
            return Err(AppError::InvalidInput(
                "min_vote_average must be between 0 and 10".to_string(),
            ));
        }

        Ok(())
    }
}

/// Assembles the discovery query for a tier
///
/// `favorite_genres` is the full ranked list; only the tier's top entries are used,
/// and an empty list leaves the query unrestricted by genre.
pub fn build_discover_query(
    tier: PersonalizationTier,
    favorite_genres: &[GenreId],
    request: &PersonalizedRequest,
) -> DiscoverQuery {
    let genres: Vec<GenreId> = favorite_genres
        .iter()
        .take(tier.genre_limit())
        .copied()
        .collect();

    let (sort_by, min_vote_average) = match tier {
        PersonalizationTier::ColdStart => (SortBy::PopularityDesc, request.min_vote_average),
        PersonalizationTier::LightHistory => (SortBy::VoteAverageDesc, request.min_vote_average),
        PersonalizationTier::RichHistory => {
            (SortBy::VoteAverageDesc, RICH_HISTORY_MIN_VOTE_AVERAGE)
        }
    };

    DiscoverQuery {
        genres,
        sort_by,
        page: request.page,
        min_vote_count: Some(request.min_vote_count),
        min_vote_average: Some(min_vote_average),
        ..DiscoverQuery::default()
    }
}

/// Drops already-rated titles from a result page
///
/// Relative order and pagination metadata are left untouched, so the page may hold
/// fewer items than the provider's page size.
pub fn exclude_rated(mut page: ResultPage, rated: &HashSet<CatalogId>) -> ResultPage {
    page.results.retain(|item| !rated.contains(&item.id));
    page
}

/// Builds a personalized discovery feed for a user
///
/// The user's rating count for `kind` selects the tier:
/// 1. fewer than 5: popular titles, no genre restriction
/// 2. 5 to 19: best-rated titles in the top 2 favorite genres
/// 3. 20 or more: best-rated titles in the top 3 favorite genres, average of at least 7.0
///
/// Titles the user already rated are removed from the returned page. Catalog and
/// store failures propagate unchanged.
pub async fn personalized_results(
    store: &dyn RatingStore,
    catalog: Arc<dyn CatalogProvider>,
    user_id: Uuid,
    kind: MediaKind,
    request: PersonalizedRequest,
) -> AppResult<ResultPage> {
    request.validate()?;

    // 1. Load rating history
    let ratings = store
        .list_ratings(&RatingFilter::for_user(user_id).media_kind(kind))
        .await?;
    let tier = PersonalizationTier::for_rating_count(ratings.len());
    let rated: HashSet<CatalogId> = ratings.iter().map(|r| r.tmdb_id).collect();

    // 2. Rank genres for users with enough history
    let genres = match tier {
        PersonalizationTier::ColdStart => Vec::new(),
        _ => favorite_genres(store, Arc::clone(&catalog), user_id, kind).await?,
    };

    // 3. Query the catalog
    let query = build_discover_query(tier, &genres, &request);

    tracing::info!(
        user_id = %user_id,
        media_kind = %kind,
        rating_count = ratings.len(),
        tier = %tier,
        genres = ?query.genres,
        provider = catalog.name(),
        "Running personalized discovery"
    );

    let page = catalog.discover(kind, &query).await?;

    // 4. Hide what the user has already rated
    let fetched = page.results.len();
    let page = exclude_rated(page, &rated);

    tracing::info!(
        user_id = %user_id,
        returned = page.results.len(),
        filtered_out = fetched - page.results.len(),
        "Personalized discovery completed"
    );

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{ratings::MockRatingStore, InMemoryRatingStore},
        models::{Genre, MediaDetails, MediaItem, Rating, RatingValue},
        services::providers::MockCatalogProvider,
    };
    use chrono::Utc;
    use serde_json::Map;
    use std::sync::Mutex;
    use tokio_test::assert_err;

    fn item(id: CatalogId) -> MediaItem {
        MediaItem {
            id,
            genre_ids: vec![],
            vote_average: 7.5,
            vote_count: 1200,
            extra: Map::new(),
        }
    }

    fn page_of(ids: &[CatalogId]) -> ResultPage {
        ResultPage {
            page: 1,
            results: ids.iter().copied().map(item).collect(),
            total_pages: 42,
            total_results: 840,
        }
    }

    /// `count` ratings on titles 1..=count; titles listed in `favorites` get `perfection`
    fn history(user_id: Uuid, count: usize, favorites: &[CatalogId]) -> InMemoryRatingStore {
        let ratings = (1..=count as CatalogId)
            .map(|tmdb_id| Rating {
                id: Uuid::new_v4(),
                user_id,
                tmdb_id,
                media_type: MediaKind::Movie,
                rating: if favorites.contains(&tmdb_id) {
                    RatingValue::Perfection
                } else {
                    RatingValue::Timepass
                },
                rated_at: Utc::now(),
                updated_at: None,
            })
            .collect();
        InMemoryRatingStore::with_ratings(ratings)
    }

    /// Catalog where title `n` belongs to genre `100 + n`, recording discovery queries
    fn recording_catalog(
        results: &[CatalogId],
    ) -> (MockCatalogProvider, Arc<Mutex<Vec<DiscoverQuery>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let page = page_of(results);

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_details().returning(|_, id| {
            Ok(MediaDetails {
                id,
                genres: vec![Genre {
                    id: 100 + id as GenreId,
                    name: String::new(),
                }],
                extra: Map::new(),
            })
        });
        catalog.expect_discover().times(1).returning(move |_, query| {
            recorded.lock().unwrap().push(query.clone());
            Ok(page.clone())
        });

        (catalog, seen)
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(
            PersonalizationTier::for_rating_count(0),
            PersonalizationTier::ColdStart
        );
        assert_eq!(
            PersonalizationTier::for_rating_count(4),
            PersonalizationTier::ColdStart
        );
        assert_eq!(
            PersonalizationTier::for_rating_count(5),
            PersonalizationTier::LightHistory
        );
        assert_eq!(
            PersonalizationTier::for_rating_count(19),
            PersonalizationTier::LightHistory
        );
        assert_eq!(
            PersonalizationTier::for_rating_count(20),
            PersonalizationTier::RichHistory
        );
    }

    #[test]
    fn test_cold_start_query_ignores_genres() {
        let request = PersonalizedRequest {
            page: 2,
            min_vote_count: 100,
            min_vote_average: 5.0,
        };
        let query = build_discover_query(PersonalizationTier::ColdStart, &[28, 12], &request);

        assert!(query.genres.is_empty());
        assert_eq!(query.sort_by, SortBy::PopularityDesc);
        assert_eq!(query.page, 2);
        assert_eq!(query.min_vote_count, Some(100));
        assert_eq!(query.min_vote_average, Some(5.0));
    }

    #[test]
    fn test_light_history_query_takes_two_genres() {
        let request = PersonalizedRequest::default();
        let query =
            build_discover_query(PersonalizationTier::LightHistory, &[18, 28, 35], &request);

        assert_eq!(query.genres, vec![18, 28]);
        assert_eq!(query.sort_by, SortBy::VoteAverageDesc);
        assert_eq!(query.min_vote_count, Some(DEFAULT_MIN_VOTE_COUNT));
        assert_eq!(query.min_vote_average, Some(DEFAULT_MIN_VOTE_AVERAGE));
    }

    #[test]
    fn test_light_history_query_with_short_genre_list() {
        let query = build_discover_query(
            PersonalizationTier::LightHistory,
            &[18],
            &PersonalizedRequest::default(),
        );
        assert_eq!(query.genres, vec![18]);

        let query = build_discover_query(
            PersonalizationTier::LightHistory,
            &[],
            &PersonalizedRequest::default(),
        );
        assert_eq!(query.genre_filter(), None);
    }

    #[test]
    fn test_rich_history_query_forces_quality_floor() {
        let request = PersonalizedRequest {
            page: 1,
            min_vote_count: 50,
            min_vote_average: 3.0,
        };
        let query =
            build_discover_query(PersonalizationTier::RichHistory, &[18, 28, 35, 12], &request);

        assert_eq!(query.genres, vec![18, 28, 35]);
        assert_eq!(query.sort_by, SortBy::VoteAverageDesc);
        assert_eq!(query.min_vote_count, Some(50));
        assert_eq!(query.min_vote_average, Some(RICH_HISTORY_MIN_VOTE_AVERAGE));
    }

    #[test]
    fn test_exclude_rated_preserves_order_and_metadata() {
        let rated: HashSet<CatalogId> = [10].into_iter().collect();
        let filtered = exclude_rated(page_of(&[5, 10, 20]), &rated);

        let ids: Vec<CatalogId> = filtered.results.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![5, 20]);
        assert_eq!(filtered.total_pages, 42);
        assert_eq!(filtered.total_results, 840);
    }

    #[test]
    fn test_exclude_rated_on_empty_page() {
        let rated: HashSet<CatalogId> = [1, 2].into_iter().collect();
        assert!(exclude_rated(page_of(&[]), &rated).results.is_empty());
    }

    #[test]
    fn test_request_validation() {
        assert!(PersonalizedRequest::default().validate().is_ok());

        for request in [
            PersonalizedRequest {
                page: 0,
                ..PersonalizedRequest::default()
            },
            PersonalizedRequest {
                page: MAX_PAGE + 1,
                ..PersonalizedRequest::default()
            },
            PersonalizedRequest {
                min_vote_average: 10.5,
                ..PersonalizedRequest::default()
            },
        ] {
            assert!(matches!(
                request.validate(),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_request_accepts_camel_case_aliases() {
        let request: PersonalizedRequest =
            serde_json::from_str(r#"{"minVoteCount": 10, "minVoteAverage": 8.0}"#).unwrap();
        assert_eq!(request.page, 1);
        assert_eq!(request.min_vote_count, 10);
        assert_eq!(request.min_vote_average, 8.0);
    }

    #[tokio::test]
    async fn test_cold_start_uses_popularity_without_genre_lookups() {
        let user = Uuid::new_v4();
        let store = history(user, 3, &[1, 2, 3]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&seen);
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_name().return_const("mock");
        catalog.expect_details().never();
        catalog.expect_discover().times(1).returning(move |_, query| {
            recorded.lock().unwrap().push(query.clone());
            Ok(page_of(&[1, 50, 60]))
        });

        let page = personalized_results(
            &store,
            Arc::new(catalog),
            user,
            MediaKind::Movie,
            PersonalizedRequest::default(),
        )
        .await
        .unwrap();

        let query = seen.lock().unwrap()[0].clone();
        assert_eq!(query.sort_by, SortBy::PopularityDesc);
        assert!(query.genres.is_empty());
        // Rated title 1 is still filtered out
        let ids: Vec<CatalogId> = page.results.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![50, 60]);
    }

    #[tokio::test]
    async fn test_light_history_filters_by_top_two_genres() {
        let user = Uuid::new_v4();
        // Favorites 2, 3, 4 map to genres 102, 103, 104
        let store = history(user, 8, &[2, 3, 4]);
        let (catalog, seen) = recording_catalog(&[3, 77, 8, 78]);

        let page = personalized_results(
            &store,
            Arc::new(catalog),
            user,
            MediaKind::Movie,
            PersonalizedRequest::default(),
        )
        .await
        .unwrap();

        let query = seen.lock().unwrap()[0].clone();
        assert_eq!(query.genres, vec![102, 103]);
        assert_eq!(query.sort_by, SortBy::VoteAverageDesc);
        assert_eq!(query.min_vote_average, Some(DEFAULT_MIN_VOTE_AVERAGE));

        let ids: Vec<CatalogId> = page.results.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![77, 78]);
        assert_eq!(page.total_pages, 42);
    }

    #[tokio::test]
    async fn test_light_history_without_favorites_omits_genre_filter() {
        let user = Uuid::new_v4();
        let store = history(user, 6, &[]);
        let (catalog, seen) = recording_catalog(&[90]);

        personalized_results(
            &store,
            Arc::new(catalog),
            user,
            MediaKind::Movie,
            PersonalizedRequest::default(),
        )
        .await
        .unwrap();

        let query = seen.lock().unwrap()[0].clone();
        assert_eq!(query.genre_filter(), None);
        assert_eq!(query.sort_by, SortBy::VoteAverageDesc);
    }

    #[tokio::test]
    async fn test_rich_history_takes_three_genres_and_raises_floor() {
        let user = Uuid::new_v4();
        let store = history(user, 25, &[5, 6, 7, 8]);
        let (catalog, seen) = recording_catalog(&[30]);

        let request = PersonalizedRequest {
            page: 3,
            min_vote_count: 200,
            min_vote_average: 4.0,
        };
        personalized_results(&store, Arc::new(catalog), user, MediaKind::Movie, request)
            .await
            .unwrap();

        let query = seen.lock().unwrap()[0].clone();
        assert_eq!(query.genres, vec![105, 106, 107]);
        assert_eq!(query.page, 3);
        assert_eq!(query.min_vote_count, Some(200));
        assert_eq!(query.min_vote_average, Some(7.0));
    }

    #[tokio::test]
    async fn test_discover_failure_propagates() {
        let user = Uuid::new_v4();
        let store = history(user, 1, &[]);

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_name().return_const("mock");
        catalog
            .expect_discover()
            .returning(|_, _| Err(AppError::ExternalApi("API returned status 500".into())));

        let err = assert_err!(
            personalized_results(
                &store,
                Arc::new(catalog),
                user,
                MediaKind::Tv,
                PersonalizedRequest::default(),
            )
            .await
        );
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates_before_catalog_calls() {
        let mut store = MockRatingStore::new();
        store
            .expect_list_ratings()
            .returning(|_| Err(AppError::Internal("connection refused".into())));

        let mut catalog = MockCatalogProvider::new();
        catalog.expect_discover().never();

        let result = personalized_results(
            &store,
            Arc::new(catalog),
            Uuid::new_v4(),
            MediaKind::Movie,
            PersonalizedRequest::default(),
        )
        .await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_invalid_request_rejected_before_store_access() {
        let mut store = MockRatingStore::new();
        store.expect_list_ratings().never();

        let result = personalized_results(
            &store,
            Arc::new(MockCatalogProvider::new()),
            Uuid::new_v4(),
            MediaKind::Movie,
            PersonalizedRequest {
                page: 0,
                ..PersonalizedRequest::default()
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
