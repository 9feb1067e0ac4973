use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::domain::auth::{RefreshRecord, UserId};
use crate::error::AppResult;
use crate::infrastructure::db::{check_connection, DbPool};

/// Persistence for the single active refresh token of each user.
///
/// Implementations must make `upsert` and `replace` atomic per user: after
/// any interleaving of calls for one user, exactly one record remains.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Replace whatever token `user_id` had with `token`
    async fn upsert(&self, user_id: &UserId, token: &str) -> AppResult<()>;

    /// Exact-match lookup across all users
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshRecord>>;

    /// Store `next` for `user_id` only if its current token is still
    /// `current`. Returns `false` when the record changed in the meantime.
    async fn replace(&self, user_id: &UserId, current: &str, next: &str) -> AppResult<bool>;

    /// Remove the user's record. Returns whether one existed.
    async fn delete_for_user(&self, user_id: &UserId) -> AppResult<bool>;

    async fn check_health(&self) -> AppResult<()>;
}

pub struct PgRefreshTokenRepository {
    pool: Arc<DbPool>,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenRepository {
    async fn upsert(&self, user_id: &UserId, token: &str) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(token)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshRecord>> {
        let pool = self.pool.as_ref();
        let record = sqlx::query_as::<_, RefreshRecord>(
            r#"
            SELECT user_id, token
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    async fn replace(&self, user_id: &UserId, current: &str, next: &str) -> AppResult<bool> {
        let pool = self.pool.as_ref();

        // The row lock taken by UPDATE serialises concurrent rotations; the
        // loser re-evaluates the predicate and matches nothing.
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET token = $3, updated_at = $4
            WHERE user_id = $1 AND token = $2
            "#,
        )
        .bind(user_id.as_str())
        .bind(current)
        .bind(next)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_health(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
