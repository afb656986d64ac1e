use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{FriendRequest, Profile},
};

/// Friend edges and pending friend requests
///
/// An accepted friendship is stored as two directed edges, one per party,
/// each denormalizing the counterpart's display name. The reciprocal pair
/// only ever comes into existence inside the accept transaction, so no
/// reader can observe an edge without its mirror.
#[derive(Clone)]
pub struct SocialService {
    db: PgPool,
}

impl SocialService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current friend set, as profiles built from the denormalized edges
    pub async fn list_friends(&self, account_id: Uuid) -> AppResult<Vec<Profile>> {
        let friends = sqlx::query_as::<_, Profile>(
            "SELECT friend_id AS account_id, friend_display_name AS display_name \
             FROM friend_edges \
             WHERE account_id = $1 \
             ORDER BY friend_display_name",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(friends)
    }

    /// Pending incoming requests, newest first
    pub async fn list_requests(&self, account_id: Uuid) -> AppResult<Vec<FriendRequest>> {
        let requests = sqlx::query_as::<_, FriendRequest>(
            "SELECT sender_id, sender_display_name, added_at \
             FROM friend_requests \
             WHERE recipient_id = $1 \
             ORDER BY added_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }

    /// Sends (or re-sends) a friend request
    ///
    /// Idempotent upsert keyed by (recipient, sender): a repeat send before
    /// acceptance refreshes the timestamp instead of erroring.
    pub async fn send_request(&self, sender_id: Uuid, recipient_id: Uuid) -> AppResult<()> {
        if sender_id == recipient_id {
            return Err(AppError::Validation(
                "cannot send a friend request to yourself".to_string(),
            ));
        }

        let sender: Option<(String,)> =
            sqlx::query_as("SELECT display_name FROM profiles WHERE account_id = $1")
                .bind(sender_id)
                .fetch_optional(&self.db)
                .await?;
        let (sender_display_name,) =
            sender.ok_or_else(|| AppError::NotFound("sender profile not found".to_string()))?;

        let result = sqlx::query(
            "INSERT INTO friend_requests (recipient_id, sender_id, sender_display_name, added_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (recipient_id, sender_id) \
             DO UPDATE SET added_at = EXCLUDED.added_at",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .bind(&sender_display_name)
        .bind(Utc::now())
        .execute(&self.db)
        .await;

        result.map_err(|e| match &e {
            // FK violation on recipient_id: no such account
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23503") => {
                AppError::NotFound("recipient not found".to_string())
            }
            _ => e.into(),
        })?;

        tracing::info!(sender = %sender_id, recipient = %recipient_id, "Friend request sent");

        Ok(())
    }

    /// Accepts a pending request as one atomic unit
    ///
    /// Exactly three mutations commit together: edge(accepter→sender),
    /// edge(sender→accepter), and the request deletion. On any failure
    /// nothing is applied and the caller may retry the whole operation.
    pub async fn accept_request(&self, account_id: Uuid, sender_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let request: Option<(String,)> = sqlx::query_as(
            "SELECT sender_display_name FROM friend_requests \
             WHERE recipient_id = $1 AND sender_id = $2 \
             FOR UPDATE",
        )
        .bind(account_id)
        .bind(sender_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (sender_display_name,) = request
            .ok_or_else(|| AppError::NotFound("no pending request from that user".to_string()))?;

        let accepter: (String,) =
            sqlx::query_as("SELECT display_name FROM profiles WHERE account_id = $1")
                .bind(account_id)
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            "INSERT INTO friend_edges (account_id, friend_id, friend_display_name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (account_id, friend_id) DO NOTHING",
        )
        .bind(account_id)
        .bind(sender_id)
        .bind(&sender_display_name)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Transaction(e.to_string()))?;

        sqlx::query(
            "INSERT INTO friend_edges (account_id, friend_id, friend_display_name) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (account_id, friend_id) DO NOTHING",
        )
        .bind(sender_id)
        .bind(account_id)
        .bind(&accepter.0)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Transaction(e.to_string()))?;

        sqlx::query("DELETE FROM friend_requests WHERE recipient_id = $1 AND sender_id = $2")
            .bind(account_id)
            .bind(sender_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| AppError::Transaction(e.to_string()))?;

        tracing::info!(accepter = %account_id, sender = %sender_id, "Friend request accepted");

        Ok(())
    }

    /// Declines a pending request; deletes it and nothing else
    ///
    /// Idempotent: declining a request that no longer exists is a no-op.
    pub async fn decline_request(&self, account_id: Uuid, sender_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM friend_requests WHERE recipient_id = $1 AND sender_id = $2")
            .bind(account_id)
            .bind(sender_id)
            .execute(&self.db)
            .await?;

        tracing::info!(recipient = %account_id, sender = %sender_id, "Friend request declined");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        // Never connects; any query would fail with a connection error
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap()
    }

    #[tokio::test]
    async fn test_send_request_to_self_rejected_before_any_query() {
        let social = SocialService::new(lazy_pool());
        let account = Uuid::new_v4();

        let err = social.send_request(account, account).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
