/// TMDB catalog provider
///
/// Wraps the TMDB v3 REST API: multi-search for titles, detail lookups for
/// runtime, and watch/providers for regional availability. All three calls
/// go through the Redis read-through cache.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        catalog::{
            CatalogItem, RegionAvailability, TmdbDetails, TmdbSearchResponse,
            TmdbWatchProvidersResponse, WatchProvider,
        },
        MediaKind,
    },
    services::catalog::CatalogProvider,
};
use chrono::Utc;
use reqwest::Client as HttpClient;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const RUNTIME_CACHE_TTL: u64 = 604800; // 1 week
const PROVIDERS_CACHE_TTL: u64 = 86400; // 1 day

/// Region is fixed, not user-selectable
const WATCH_REGION: &str = "US";

/// TMDB path segment for a media kind ("tv", not "series")
fn tmdb_path(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "tv",
    }
}

#[derive(Clone)]
pub struct TmdbCatalog {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbCatalog {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    /// GET a TMDB endpoint, mapping non-2xx responses to `ExternalApi`
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Catalog API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbCatalog {
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        if query.trim().is_empty() {
            return Err(AppError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::CatalogSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/search/multi", self.api_url);
                let response: TmdbSearchResponse =
                    self.get_json(&url, &[("query", query)]).await?;

                let items: Vec<CatalogItem> = response
                    .results
                    .into_iter()
                    .filter_map(|r| r.into_catalog_item())
                    .collect();

                tracing::info!(
                    query = %query,
                    results = items.len(),
                    provider = "tmdb",
                    "Catalog search completed"
                );

                Ok::<_, AppError>(items)
            }
        )
    }

    async fn runtime_minutes(&self, kind: MediaKind, item_id: i64) -> AppResult<i32> {
        cached!(
            self.cache,
            CacheKey::Runtime(kind, item_id),
            RUNTIME_CACHE_TTL,
            async move {
                let url = format!("{}/{}/{}", self.api_url, tmdb_path(kind), item_id);
                let details: TmdbDetails = self.get_json(&url, &[]).await?;
                let minutes = details.runtime_minutes();

                tracing::debug!(
                    item_id = item_id,
                    kind = kind.as_str(),
                    minutes = minutes,
                    "Runtime resolved"
                );

                Ok::<_, AppError>(minutes)
            }
        )
    }

    async fn watch_providers(
        &self,
        kind: MediaKind,
        item_id: i64,
    ) -> AppResult<RegionAvailability> {
        cached!(
            self.cache,
            CacheKey::Providers(kind, item_id),
            PROVIDERS_CACHE_TTL,
            async move {
                let url = format!(
                    "{}/{}/{}/watch/providers",
                    self.api_url,
                    tmdb_path(kind),
                    item_id
                );
                let response: TmdbWatchProvidersResponse = self.get_json(&url, &[]).await?;

                // Titles with no offering in the region come back as an
                // empty availability rather than an error
                let region = response.results.get(WATCH_REGION).cloned().unwrap_or_default();

                let availability = RegionAvailability {
                    item_id,
                    media_kind: kind,
                    region: WATCH_REGION.to_string(),
                    link: region.link,
                    flatrate: region.flatrate.into_iter().map(WatchProvider::from).collect(),
                    rent: region.rent.into_iter().map(WatchProvider::from).collect(),
                    buy: region.buy.into_iter().map(WatchProvider::from).collect(),
                    cached_at: Utc::now(),
                };

                tracing::info!(
                    item_id = item_id,
                    kind = kind.as_str(),
                    flatrate = availability.flatrate.len(),
                    provider = "tmdb",
                    "Watch providers fetched"
                );

                Ok::<_, AppError>(availability)
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_path_uses_tv_for_series() {
        assert_eq!(tmdb_path(MediaKind::Movie), "movie");
        assert_eq!(tmdb_path(MediaKind::Series), "tv");
    }
}
