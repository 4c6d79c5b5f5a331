/// TMDB (The Movie Database) v3 provider
///
/// Every request goes through the Redis read-through cache. Listing endpoints
/// expire after an hour, per-title data after a day.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CatalogId, DiscoverQuery, GenreList, MediaDetails, MediaKind, ResultPage, TimeWindow},
    services::providers::CatalogProvider,
};

const LIST_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86400; // 24 hours

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Issues a GET against the provider and decodes the JSON body
    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                provider = "tmdb",
                "Catalog request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        let data = response.json().await?;
        tracing::debug!(path = %path, provider = "tmdb", "Catalog request completed");

        Ok(data)
    }

    async fn get_cached<T>(
        &self,
        key: CacheKey,
        path: String,
        params: Vec<(&'static str, String)>,
        ttl: u64,
    ) -> AppResult<T>
    where
        T: DeserializeOwned + Serialize + Send,
    {
        cached!(self.cache, key, ttl, self.fetch::<T>(&path, &params))
    }
}

/// Serializes parameters in order, for use inside cache keys
fn params_fingerprint(params: &[(&'static str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn discover(&self, kind: MediaKind, query: &DiscoverQuery) -> AppResult<ResultPage> {
        let params = query.to_params(kind);
        let key = CacheKey::Discover(kind, params_fingerprint(&params));

        let page: ResultPage = self
            .get_cached(key, format!("/discover/{}", kind), params, LIST_CACHE_TTL)
            .await?;

        tracing::info!(
            media_kind = %kind,
            page = page.page,
            results = page.results.len(),
            provider = "tmdb",
            "Discovery query completed"
        );

        Ok(page)
    }

    async fn details(&self, kind: MediaKind, id: CatalogId) -> AppResult<MediaDetails> {
        self.get_cached(
            CacheKey::Details(kind, id),
            format!("/{}/{}", kind, id),
            Vec::new(),
            DETAILS_CACHE_TTL,
        )
        .await
    }

    async fn trending(&self, kind: MediaKind, window: TimeWindow) -> AppResult<ResultPage> {
        self.get_cached(
            CacheKey::Trending(kind, window),
            format!("/trending/{}/{}", kind, window),
            Vec::new(),
            LIST_CACHE_TTL,
        )
        .await
    }

    async fn popular(&self, kind: MediaKind) -> AppResult<ResultPage> {
        self.get_cached(
            CacheKey::Popular(kind),
            format!("/{}/popular", kind),
            Vec::new(),
            LIST_CACHE_TTL,
        )
        .await
    }

    async fn search(&self, kind: MediaKind, query: &str) -> AppResult<ResultPage> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let page: ResultPage = self
            .get_cached(
                CacheKey::Search(kind, query.to_string()),
                format!("/search/{}", kind),
                vec![("query", query.to_string())],
                LIST_CACHE_TTL,
            )
            .await?;

        tracing::info!(
            query = %query,
            results = page.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(page)
    }

    async fn credits(&self, kind: MediaKind, id: CatalogId) -> AppResult<serde_json::Value> {
        self.get_cached(
            CacheKey::Credits(kind, id),
            format!("/{}/{}/credits", kind, id),
            Vec::new(),
            DETAILS_CACHE_TTL,
        )
        .await
    }

    async fn videos(&self, kind: MediaKind, id: CatalogId) -> AppResult<serde_json::Value> {
        self.get_cached(
            CacheKey::Videos(kind, id),
            format!("/{}/{}/videos", kind, id),
            Vec::new(),
            DETAILS_CACHE_TTL,
        )
        .await
    }

    async fn genres(&self, kind: MediaKind) -> AppResult<GenreList> {
        self.get_cached(
            CacheKey::Genres(kind),
            format!("/genre/{}/list", kind),
            Vec::new(),
            DETAILS_CACHE_TTL,
        )
        .await
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
