use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CatalogId, MediaKind};

/// Four-level verdict a user gives a title, lowest to highest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ratingvalue", rename_all = "snake_case")]
pub enum RatingValue {
    Skip,
    Timepass,
    GoForIt,
    Perfection,
}

impl RatingValue {
    /// Values that count towards a user's genre preferences
    pub const FAVORABLE: [RatingValue; 2] = [RatingValue::GoForIt, RatingValue::Perfection];

    /// How many times an item's genres are counted for this rating
    pub fn genre_weight(&self) -> usize {
        match self {
            RatingValue::Perfection => 2,
            RatingValue::GoForIt => 1,
            RatingValue::Skip | RatingValue::Timepass => 0,
        }
    }
}

/// A user's rating of one catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
    pub rating: RatingValue,
    pub rated_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for recording a first rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRating {
    pub user_id: Uuid,
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
    pub rating: RatingValue,
}

/// Selection criteria for reading a user's ratings
#[derive(Debug, Clone, PartialEq)]
pub struct RatingFilter {
    pub user_id: Uuid,
    pub media_kind: Option<MediaKind>,
    /// Restrict to these values; `None` keeps every value
    pub values: Option<Vec<RatingValue>>,
}

impl RatingFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id,
            media_kind: None,
            values: None,
        }
    }

    pub fn media_kind(mut self, kind: MediaKind) -> Self {
        self.media_kind = Some(kind);
        self
    }

    pub fn values(mut self, values: &[RatingValue]) -> Self {
        self.values = Some(values.to_vec());
        self
    }

    pub fn matches(&self, rating: &Rating) -> bool {
        rating.user_id == self.user_id
            && self.media_kind.map_or(true, |kind| rating.media_type == kind)
            && self
                .values
                .as_ref()
                .map_or(true, |values| values.contains(&rating.rating))
    }
}
