use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, AppError, AppResult},
    models::Profile,
};

const MIN_DISPLAY_NAME_CHARS: usize = 3;
const PROFILE_SEARCH_LIMIT: i64 = 20;

/// Account registration, login and profile directory
///
/// Accounts carry the credential; profiles are the public, searchable face.
/// A profile is created once at signup and never renamed, and its lowercased
/// display name is globally unique.
#[derive(Clone)]
pub struct IdentityService {
    db: PgPool,
}

impl IdentityService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Registers a new account with a unique display name
    ///
    /// Validation runs before any write. The display-name pre-check gives a
    /// friendly conflict message; the unique index on `display_name_lower`
    /// closes the remaining check-then-write race under concurrent signups.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AppResult<Uuid> {
        let display_name = display_name.trim();
        validate_display_name(display_name)?;

        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation("invalid email address".to_string()));
        }
        if password.is_empty() {
            return Err(AppError::Validation("password cannot be empty".to_string()));
        }

        let display_name_lower = display_name.to_lowercase();

        let taken: Option<(Uuid,)> =
            sqlx::query_as("SELECT account_id FROM profiles WHERE display_name_lower = $1")
                .bind(&display_name_lower)
                .fetch_optional(&self.db)
                .await?;

        if taken.is_some() {
            return Err(AppError::Conflict(
                "display name is already taken".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let account_id = Uuid::new_v4();

        // Account first, then profile, matching the signup order the product
        // defines. Both inserts sit in one transaction so a failed profile
        // write cannot strand an orphaned account.
        let mut tx = self.db.begin().await?;

        sqlx::query("INSERT INTO accounts (id, email, password_hash) VALUES ($1, $2, $3)")
            .bind(account_id)
            .bind(&email)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::Conflict("email is already registered".to_string())
                } else {
                    e.into()
                }
            })?;

        sqlx::query(
            "INSERT INTO profiles (account_id, display_name, display_name_lower) \
             VALUES ($1, $2, $3)",
        )
        .bind(account_id)
        .bind(display_name)
        .bind(&display_name_lower)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("display name is already taken".to_string())
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        tracing::info!(account_id = %account_id, "Account registered");

        Ok(account_id)
    }

    /// Verifies credentials and returns the account id
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Uuid> {
        let email = email.trim().to_lowercase();

        let row: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, password_hash FROM accounts WHERE email = $1")
                .bind(&email)
                .fetch_optional(&self.db)
                .await?;

        // Same message for unknown email and wrong password
        let (account_id, password_hash) =
            row.ok_or_else(|| AppError::Auth("invalid email or password".to_string()))?;

        if !verify_password(password, &password_hash) {
            return Err(AppError::Auth("invalid email or password".to_string()));
        }

        Ok(account_id)
    }

    /// Loads the profile owned by an account
    pub async fn profile(&self, account_id: Uuid) -> AppResult<Profile> {
        sqlx::query_as::<_, Profile>(
            "SELECT account_id, display_name FROM profiles WHERE account_id = $1",
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("profile not found".to_string()))
    }

    /// Case-insensitive display-name prefix search, excluding the caller
    pub async fn search_profiles(&self, caller: Uuid, prefix: &str) -> AppResult<Vec<Profile>> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("{}%", escape_like(&prefix));

        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT account_id, display_name FROM profiles \
             WHERE display_name_lower LIKE $1 AND account_id <> $2 \
             ORDER BY display_name_lower \
             LIMIT $3",
        )
        .bind(&pattern)
        .bind(caller)
        .bind(PROFILE_SEARCH_LIMIT)
        .fetch_all(&self.db)
        .await?;

        Ok(profiles)
    }
}

fn validate_display_name(display_name: &str) -> AppResult<()> {
    if display_name.chars().count() < MIN_DISPLAY_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "display name must be at least {} characters",
            MIN_DISPLAY_NAME_CHARS
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Escapes LIKE wildcards so user input only ever matches literally
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_minimum_length() {
        assert!(validate_display_name("ab").is_err());
        assert!(validate_display_name("abc").is_ok());
    }

    #[test]
    fn test_display_name_length_counts_chars_not_bytes() {
        // Three two-byte characters
        assert!(validate_display_name("äöü").is_ok());
    }

    #[test]
    fn test_short_display_name_is_validation_error() {
        let err = validate_display_name("ab").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_register_short_name_performs_no_writes() {
        // A lazy pool never connects; any write attempt would error with a
        // connection failure instead of a validation error.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unreachable")
            .unwrap();
        let identity = IdentityService::new(pool);

        let err = identity
            .register("a@example.com", "pw", "ab")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
