use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{catalog::CatalogItem, ListKind, MediaEntry},
    services::catalog::CatalogProvider,
};

/// Per-user watched and wish lists
#[derive(Clone)]
pub struct ListService {
    db: PgPool,
}

impl ListService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Upserts a catalog item into one of the caller's lists
    ///
    /// Keyed by catalog item id within (owner, list): re-adding the same
    /// title overwrites the row and refreshes `added_at` rather than
    /// duplicating. Runtime comes from a secondary catalog detail lookup.
    pub async fn add_entry(
        &self,
        catalog: &dyn CatalogProvider,
        account_id: Uuid,
        kind: ListKind,
        item: CatalogItem,
    ) -> AppResult<MediaEntry> {
        if item.title.trim().is_empty() {
            return Err(AppError::Validation("title cannot be empty".to_string()));
        }

        let runtime_minutes = resolve_runtime(catalog, &item).await;
        let added_at = Utc::now();

        let entry = sqlx::query_as::<_, MediaEntry>(
            "INSERT INTO media_entries \
               (account_id, list_kind, item_id, title, poster_path, media_kind, \
                release_date, runtime_minutes, added_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (account_id, list_kind, item_id) DO UPDATE SET \
               title = EXCLUDED.title, \
               poster_path = EXCLUDED.poster_path, \
               media_kind = EXCLUDED.media_kind, \
               release_date = EXCLUDED.release_date, \
               runtime_minutes = EXCLUDED.runtime_minutes, \
               added_at = EXCLUDED.added_at \
             RETURNING item_id, title, poster_path, media_kind, release_date, \
                       runtime_minutes, added_at",
        )
        .bind(account_id)
        .bind(kind)
        .bind(item.id)
        .bind(item.title.trim())
        .bind(&item.poster_path)
        .bind(item.media_kind)
        .bind(&item.release_date)
        .bind(runtime_minutes)
        .bind(added_at)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            account_id = %account_id,
            list = kind.as_str(),
            item_id = item.id,
            "List entry added"
        );

        Ok(entry)
    }

    /// Deletes an entry unconditionally
    ///
    /// Removing an entry that does not exist is a successful no-op.
    pub async fn remove_entry(
        &self,
        account_id: Uuid,
        kind: ListKind,
        item_id: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "DELETE FROM media_entries \
             WHERE account_id = $1 AND list_kind = $2 AND item_id = $3",
        )
        .bind(account_id)
        .bind(kind)
        .bind(item_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Full snapshot of one list, most recently added first
    pub async fn entries(&self, account_id: Uuid, kind: ListKind) -> AppResult<Vec<MediaEntry>> {
        let entries = sqlx::query_as::<_, MediaEntry>(
            "SELECT item_id, title, poster_path, media_kind, release_date, \
                    runtime_minutes, added_at \
             FROM media_entries \
             WHERE account_id = $1 AND list_kind = $2 \
             ORDER BY added_at DESC",
        )
        .bind(account_id)
        .bind(kind)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}

/// Resolves a title's runtime via the catalog, substituting 0 on failure
///
/// A catalog outage should not stop a user from tracking a title; the entry
/// just loses its runtime.
async fn resolve_runtime(catalog: &dyn CatalogProvider, item: &CatalogItem) -> i32 {
    match catalog.runtime_minutes(item.media_kind, item.id).await {
        Ok(minutes) => minutes.max(0),
        Err(e) => {
            tracing::warn!(
                item_id = item.id,
                error = %e,
                "Runtime lookup failed, defaulting to 0"
            );
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use crate::services::catalog::MockCatalogProvider;

    fn movie(id: i64) -> CatalogItem {
        CatalogItem {
            id,
            media_kind: MediaKind::Movie,
            title: "The Matrix".to_string(),
            poster_path: None,
            release_date: Some("1999-03-31".to_string()),
        }
    }

    #[tokio::test]
    async fn test_resolve_runtime_uses_catalog_value() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_runtime_minutes()
            .withf(|kind, id| *kind == MediaKind::Movie && *id == 603)
            .returning(|_, _| Ok(136));

        assert_eq!(resolve_runtime(&catalog, &movie(603)).await, 136);
    }

    #[tokio::test]
    async fn test_resolve_runtime_defaults_to_zero_on_lookup_failure() {
        let mut catalog = MockCatalogProvider::new();
        catalog
            .expect_runtime_minutes()
            .returning(|_, _| Err(AppError::ExternalApi("catalog down".to_string())));

        assert_eq!(resolve_runtime(&catalog, &movie(603)).await, 0);
    }

    #[tokio::test]
    async fn test_resolve_runtime_clamps_negative_values() {
        let mut catalog = MockCatalogProvider::new();
        catalog.expect_runtime_minutes().returning(|_, _| Ok(-10));

        assert_eq!(resolve_runtime(&catalog, &movie(603)).await, 0);
    }
}
