//! Postgres user directory.
//!
//! Users self-register on first contact: the upsert keeps the original
//! `created_at` and only refreshes profile fields the transport actually
//! supplied.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linklet_core::{OwnerId, Result};
use linklet_platform_access::{AccessError, User, UserDirectory, UserProfile};
use sqlx::{FromRow, PgPool};
use tracing::debug;

/// Row type for user queries.
#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: Option<String>,
    first_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User::with_all_fields(
            OwnerId::from_i64(self.id),
            self.username,
            self.first_name,
            self.created_at,
            self.updated_at,
        )
    }
}

/// Directory of registered users.
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Creates a new directory.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn ensure_registered(&self, profile: &UserProfile) -> Result<User, AccessError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, username, first_name, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                username = COALESCE(EXCLUDED.username, users.username),
                first_name = COALESCE(EXCLUDED.first_name, users.first_name),
                updated_at = NOW()
            RETURNING id, username, first_name, created_at, updated_at
            "#,
        )
        .bind(profile.id.as_i64())
        .bind(&profile.username)
        .bind(&profile.first_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AccessError::StorageFailed {
            details: e.to_string(),
        })?;

        debug!(owner_id = %profile.id, "user registered or refreshed");
        Ok(row.into_user())
    }

    async fn find(&self, id: OwnerId) -> Result<Option<User>, AccessError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, username, first_name, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccessError::StorageFailed {
            details: e.to_string(),
        })?;

        Ok(row.map(UserRow::into_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_into_user() {
        let now = Utc::now();
        let row = UserRow {
            id: 42,
            username: Some("alice".to_string()),
            first_name: None,
            created_at: now,
            updated_at: now,
        };

        let user = row.into_user();
        assert_eq!(user.id(), OwnerId::from_i64(42));
        assert_eq!(user.username(), Some("alice"));
        assert!(user.first_name().is_none());
    }
}
