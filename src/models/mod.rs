use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;

pub mod rating;
pub mod watchlist;

pub use rating::{NewRating, Rating, RatingFilter, RatingValue};
pub use watchlist::{NewWatchlistItem, WatchlistItem};

/// Catalog provider's numeric identifier for a movie or series
pub type CatalogId = i64;

/// Catalog provider's numeric identifier for a genre
pub type GenreId = u32;

/// Kind of media tracked by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "mediatype", rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment the catalog provider uses for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Discover parameter that restricts results to a release year
    fn year_param(&self) -> &'static str {
        match self {
            MediaKind::Movie => "primary_release_year",
            MediaKind::Tv => "first_air_date_year",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trending window supported by the catalog provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeWindow::Day => write!(f, "day"),
            TimeWindow::Week => write!(f, "week"),
        }
    }
}

/// Sort orders accepted by discovery queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "vote_average.desc")]
    VoteAverageDesc,
    #[serde(rename = "vote_count.desc")]
    VoteCountDesc,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::VoteAverageDesc => "vote_average.desc",
            SortBy::VoteCountDesc => "vote_count.desc",
        }
    }
}

/// Filter and sort criteria for a discovery query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverQuery {
    /// Genres every result must carry; omitted from the request when empty
    pub genres: Vec<GenreId>,
    pub sort_by: SortBy,
    pub page: u32,
    pub min_vote_count: Option<u32>,
    pub min_vote_average: Option<f64>,
    pub year: Option<i32>,
    pub language: Option<String>,
    pub region: Option<String>,
}

impl Default for DiscoverQuery {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            sort_by: SortBy::default(),
            page: 1,
            min_vote_count: None,
            min_vote_average: None,
            year: None,
            language: None,
            region: None,
        }
    }
}

impl DiscoverQuery {
    /// Genre filter in the provider's comma-joined form, `None` when unrestricted
    pub fn genre_filter(&self) -> Option<String> {
        if self.genres.is_empty() {
            return None;
        }

        Some(
            self.genres
                .iter()
                .map(|g| g.to_string())
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Query-string parameters for the provider's discover endpoint
    ///
    /// Parameters come out in a fixed order so they double as a cache fingerprint.
    pub fn to_params(&self, kind: MediaKind) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", self.sort_by.as_str().to_string()),
            ("page", self.page.to_string()),
        ];

        if let Some(genres) = self.genre_filter() {
            params.push(("with_genres", genres));
        }
        if let Some(count) = self.min_vote_count {
            params.push(("vote_count.gte", count.to_string()));
        }
        if let Some(average) = self.min_vote_average {
            params.push(("vote_average.gte", average.to_string()));
        }
        if let Some(year) = self.year {
            params.push((kind.year_param(), year.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("with_original_language", language.clone()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }

        params
    }
}

/// A single movie or series as returned in a catalog result page
///
/// Only the fields the recommendation engine reads are typed; everything else
/// the provider sends is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: CatalogId,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paged list of catalog items in the provider's page format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<MediaItem>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Full detail record for a movie or series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    pub id: CatalogId,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaDetails {
    pub fn genre_ids(&self) -> Vec<GenreId> {
        self.genres.iter().map(|g| g.id).collect()
    }
}
