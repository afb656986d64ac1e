/// Catalog gateway abstraction
///
/// The external media-metadata API sits behind this trait so handlers and
/// list logic never see provider specifics, and tests can substitute a mock.
use crate::{
    error::AppResult,
    models::{
        catalog::{CatalogItem, RegionAvailability},
        MediaKind,
    },
};

pub mod tmdb;

pub use tmdb::TmdbCatalog;

/// Trait for catalog data providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Search movies and series by free-text query
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>>;

    /// Resolve a title's runtime in minutes via a detail lookup
    ///
    /// Returns 0 when the catalog has no runtime for the title.
    async fn runtime_minutes(&self, kind: MediaKind, item_id: i64) -> AppResult<i32>;

    /// Fetch regional watch-provider lists for a title
    async fn watch_providers(
        &self,
        kind: MediaKind,
        item_id: i64,
    ) -> AppResult<RegionAvailability>;
}
