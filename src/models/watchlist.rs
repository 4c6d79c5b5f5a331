use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CatalogId, MediaKind};

/// A title a user saved to watch later
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWatchlistItem {
    pub user_id: Uuid,
    pub tmdb_id: CatalogId,
    pub media_type: MediaKind,
}

impl WatchlistItem {
    /// Whether this entry is the same title as `other`, for the same user
    pub fn same_title(&self, other: &NewWatchlistItem) -> bool {
        self.user_id == other.user_id
            && self.tmdb_id == other.tmdb_id
            && self.media_type == other.media_type
    }
}
