use redis::AsyncCommands;
use redis::Client;
use uuid::Uuid;

use crate::error::AppResult;

/// Sessions live for 30 days, refreshed only by a new login
const SESSION_TTL: u64 = 60 * 60 * 24 * 30;

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Bearer-token session store backed by Redis
///
/// Logout deletes the key, which terminates the session everywhere the
/// token was held. Accounts themselves are never destroyed.
#[derive(Clone)]
pub struct SessionStore {
    redis_client: Client,
}

impl SessionStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Issues a fresh opaque token for the given account
    pub async fn create(&self, account_id: Uuid) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        let _: () = conn
            .set_ex(session_key(&token), account_id.to_string(), SESSION_TTL)
            .await?;

        tracing::debug!(account_id = %account_id, "Session created");

        Ok(token)
    }

    /// Resolves a token to its account, or `None` when expired or unknown
    pub async fn lookup(&self, token: &str) -> AppResult<Option<Uuid>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(session_key(token)).await?;

        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    /// Destroys a session; a no-op for tokens that are already gone
    pub async fn destroy(&self, token: &str) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(session_key(token)).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_format() {
        assert_eq!(session_key("abc123"), "session:abc123");
    }
}
