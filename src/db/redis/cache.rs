use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::MediaKind;

/// Keys for cached catalog responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    CatalogSearch(String),
    Runtime(MediaKind, i64),
    Providers(MediaKind, i64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::CatalogSearch(query) => {
                write!(f, "catalog:search:{}", query.to_lowercase())
            }
            CacheKey::Runtime(kind, id) => write!(f, "catalog:runtime:{}:{}", kind.as_str(), id),
            CacheKey::Providers(kind, id) => {
                write!(f, "catalog:providers:{}:{}", kind.as_str(), id)
            }
        }
    }
}

/// Creates a Redis client for caching and sessions
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache backed by Redis
///
/// Reads are synchronous; writes are handed off to a background task so a
/// slow Redis write never delays an API response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

impl Cache {
    /// Creates a new cache and spawns its background write task
    pub fn new(redis_client: Client) -> Self {
        let (write_tx, write_rx) = mpsc::unbounded_channel();

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx).await;
        });

        Self {
            redis_client,
            write_tx,
        }
    }

    /// Drains cache write messages for the lifetime of the process
    async fn cache_writer_task(client: Client, mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>) {
        tracing::debug!("Cache writer task started");

        while let Some(msg) = write_rx.recv().await {
            if let Err(e) = Self::write_to_redis(&client, msg).await {
                tracing::error!(error = %e, "Failed to write to Redis cache");
            }
        }

        tracing::debug!("Cache writer task stopped");
    }

    /// Writes a single message to Redis
    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` on a cache miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache without blocking the caller
    ///
    /// Serializes the value and sends it to the background writer. The
    /// actual Redis write happens asynchronously; callers get no delivery
    /// confirmation.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_catalog_search() {
        let key = CacheKey::CatalogSearch("Inception".to_string());
        assert_eq!(format!("{}", key), "catalog:search:inception");
    }

    #[test]
    fn test_cache_key_display_catalog_search_lowercases() {
        let key = CacheKey::CatalogSearch("THE MATRIX".to_string());
        assert_eq!(format!("{}", key), "catalog:search:the matrix");
    }

    #[test]
    fn test_cache_key_display_runtime() {
        let key = CacheKey::Runtime(MediaKind::Movie, 603);
        assert_eq!(format!("{}", key), "catalog:runtime:movie:603");
    }

    #[test]
    fn test_cache_key_display_providers_series() {
        let key = CacheKey::Providers(MediaKind::Series, 1396);
        assert_eq!(format!("{}", key), "catalog:providers:series:1396");
    }
}
