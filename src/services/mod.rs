pub mod catalog;
pub mod genre_preferences;
pub mod providers;
pub mod ratings;
pub mod recommendations;
pub mod watchlist;

pub use providers::{CatalogProvider, TmdbProvider};
