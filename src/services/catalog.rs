use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{DiscoverQuery, GenreId, MediaKind, ResultPage},
    services::{providers::CatalogProvider, recommendations::MAX_PAGE},
};

/// Parses a comma-separated genre filter such as `"28,12"`
///
/// Blank entries are ignored, so an empty string means no genre restriction.
pub fn parse_genre_list(raw: &str) -> AppResult<Vec<GenreId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<GenreId>()
                .map_err(|_| AppError::InvalidInput(format!("Invalid genre id: {}", part)))
        })
        .collect()
}

/// Title search, delegated to the configured catalog provider
pub async fn search_titles(
    provider: Arc<dyn CatalogProvider>,
    kind: MediaKind,
    query: &str,
) -> AppResult<ResultPage> {
    provider.search(kind, query).await
}

/// Open-ended catalog discovery with caller-chosen filters
pub async fn discover_titles(
    provider: Arc<dyn CatalogProvider>,
    kind: MediaKind,
    query: DiscoverQuery,
) -> AppResult<ResultPage> {
    if query.page == 0 || query.page > MAX_PAGE {
        return Err(AppError::InvalidInput(format!(
            "page must be between 1 and {}",
            MAX_PAGE
        )));
    }

    provider.discover(kind, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::MockCatalogProvider;

    #[test]
    fn test_parse_genre_list() {
        assert_eq!(parse_genre_list("28,12").unwrap(), vec![28, 12]);
        assert_eq!(parse_genre_list(" 18 , ,35").unwrap(), vec![18, 35]);
        assert!(parse_genre_list("").unwrap().is_empty());
        assert!(matches!(
            parse_genre_list("28,action"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_discover_rejects_out_of_range_page() {
        let mut provider = MockCatalogProvider::new();
        provider.expect_discover().never();

        let query = DiscoverQuery {
            page: 501,
            ..DiscoverQuery::default()
        };
        let result = discover_titles(Arc::new(provider), MediaKind::Movie, query).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
