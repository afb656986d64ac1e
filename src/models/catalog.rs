use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::MediaKind;

/// A searchable movie or series from the external catalog
///
/// This is what clients pass back when adding a title to a list, so it is
/// both a response and a request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Response envelope from GET /search/multi
#[derive(Debug, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

/// One raw result from TMDB multi-search
///
/// Movies carry `title`/`release_date`, series carry `name`/`first_air_date`.
/// Results with other media types (people, collections) are dropped.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: i64,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
}

impl TmdbSearchResult {
    /// Converts a raw search result into a catalog item
    ///
    /// Returns `None` for non-movie/series results or when the title field
    /// is missing entirely.
    pub fn into_catalog_item(self) -> Option<CatalogItem> {
        let media_kind = match self.media_type.as_deref() {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Series,
            _ => return None,
        };

        let title = match media_kind {
            MediaKind::Movie => self.title,
            MediaKind::Series => self.name,
        }?;

        // Empty date strings show up in TMDB responses; treat them as absent
        let release_date = match media_kind {
            MediaKind::Movie => self.release_date,
            MediaKind::Series => self.first_air_date,
        }
        .filter(|d| !d.is_empty());

        Some(CatalogItem {
            id: self.id,
            media_kind,
            title,
            poster_path: self.poster_path,
            release_date,
        })
    }
}

/// Detail response from GET /{movie|tv}/{id}, reduced to runtime fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbDetails {
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub episode_run_time: Vec<i32>,
}

impl TmdbDetails {
    /// Runtime in minutes; 0 when the catalog does not know
    pub fn runtime_minutes(&self) -> i32 {
        self.runtime
            .or_else(|| self.episode_run_time.first().copied())
            .unwrap_or(0)
            .max(0)
    }
}

/// Response envelope from GET /{movie|tv}/{id}/watch/providers
#[derive(Debug, Deserialize)]
pub struct TmdbWatchProvidersResponse {
    #[serde(default)]
    pub results: HashMap<String, TmdbRegionProviders>,
}

/// Per-region provider lists as returned by TMDB
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbRegionProviders {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<TmdbProvider>,
    #[serde(default)]
    pub rent: Vec<TmdbProvider>,
    #[serde(default)]
    pub buy: Vec<TmdbProvider>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbProvider {
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

/// One streaming/rent/buy provider offering a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProvider {
    pub name: String,
    pub logo_path: Option<String>,
}

impl From<TmdbProvider> for WatchProvider {
    fn from(p: TmdbProvider) -> Self {
        Self {
            name: p.provider_name,
            logo_path: p.logo_path,
        }
    }
}

/// Where a title can be watched in one region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionAvailability {
    pub item_id: i64,
    pub media_kind: MediaKind,
    pub region: String,
    pub link: Option<String>,
    pub flatrate: Vec<WatchProvider>,
    pub rent: Vec<WatchProvider>,
    pub buy: Vec<WatchProvider>,
    pub cached_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_movie_conversion() {
        let json = r#"{
            "id": 603,
            "media_type": "movie",
            "title": "The Matrix",
            "poster_path": "/matrix.jpg",
            "release_date": "1999-03-31"
        }"#;

        let result: TmdbSearchResult = serde_json::from_str(json).unwrap();
        let item = result.into_catalog_item().unwrap();

        assert_eq!(item.id, 603);
        assert_eq!(item.media_kind, MediaKind::Movie);
        assert_eq!(item.title, "The Matrix");
        assert_eq!(item.release_date, Some("1999-03-31".to_string()));
    }

    #[test]
    fn test_search_result_series_uses_name_and_first_air_date() {
        let json = r#"{
            "id": 1396,
            "media_type": "tv",
            "name": "Breaking Bad",
            "first_air_date": "2008-01-20"
        }"#;

        let result: TmdbSearchResult = serde_json::from_str(json).unwrap();
        let item = result.into_catalog_item().unwrap();

        assert_eq!(item.media_kind, MediaKind::Series);
        assert_eq!(item.title, "Breaking Bad");
        assert_eq!(item.release_date, Some("2008-01-20".to_string()));
        assert_eq!(item.poster_path, None);
    }

    #[test]
    fn test_search_result_person_is_filtered() {
        let json = r#"{
            "id": 6384,
            "media_type": "person",
            "name": "Keanu Reeves"
        }"#;

        let result: TmdbSearchResult = serde_json::from_str(json).unwrap();
        assert!(result.into_catalog_item().is_none());
    }

    #[test]
    fn test_search_result_empty_date_treated_as_absent() {
        let result = TmdbSearchResult {
            id: 1,
            media_type: Some("movie".to_string()),
            title: Some("Unreleased".to_string()),
            name: None,
            poster_path: None,
            release_date: Some(String::new()),
            first_air_date: None,
        };

        let item = result.into_catalog_item().unwrap();
        assert_eq!(item.release_date, None);
    }

    #[test]
    fn test_runtime_minutes_movie() {
        let details = TmdbDetails {
            runtime: Some(136),
            episode_run_time: vec![],
        };
        assert_eq!(details.runtime_minutes(), 136);
    }

    #[test]
    fn test_runtime_minutes_series_uses_first_episode_run_time() {
        let details = TmdbDetails {
            runtime: None,
            episode_run_time: vec![47, 45],
        };
        assert_eq!(details.runtime_minutes(), 47);
    }

    #[test]
    fn test_runtime_minutes_unknown_defaults_to_zero() {
        let details = TmdbDetails {
            runtime: None,
            episode_run_time: vec![],
        };
        assert_eq!(details.runtime_minutes(), 0);
    }

    #[test]
    fn test_runtime_minutes_never_negative() {
        let details = TmdbDetails {
            runtime: Some(-5),
            episode_run_time: vec![],
        };
        assert_eq!(details.runtime_minutes(), 0);
    }

    #[test]
    fn test_watch_providers_deserialization() {
        let json = r#"{
            "results": {
                "US": {
                    "link": "https://www.themoviedb.org/movie/603/watch",
                    "flatrate": [
                        {"provider_name": "Netflix", "logo_path": "/netflix.jpg"}
                    ],
                    "rent": [
                        {"provider_name": "Apple TV", "logo_path": null}
                    ]
                }
            }
        }"#;

        let response: TmdbWatchProvidersResponse = serde_json::from_str(json).unwrap();
        let us = response.results.get("US").unwrap();

        assert_eq!(us.flatrate.len(), 1);
        assert_eq!(us.flatrate[0].provider_name, "Netflix");
        assert_eq!(us.rent.len(), 1);
        assert_eq!(us.buy.len(), 0);
    }
}
