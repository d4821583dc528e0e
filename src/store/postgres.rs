/// Postgres-backed session store
///
/// `users` holds one row per identity; `sessions` holds one row per
/// outstanding refresh credential. Rotation is a single UPDATE keyed on
/// (user_guid, key, unexpired), which gives the compare-and-swap the
/// service relies on without an explicit transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StorageError;
use crate::store::{Session, SessionStore, UserRecord};

pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn get_user(&self, guid: &str) -> Result<UserRecord, StorageError> {
        sqlx::query_scalar::<_, String>("SELECT guid FROM users WHERE guid = $1")
            .bind(guid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound)?;

        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            r#"
            SELECT key, refresh_secret_hash, expires_at
            FROM sessions
            WHERE user_guid = $1 AND expires_at > now()
            "#,
        )
        .bind(guid)
        .fetch_all(&self.pool)
        .await?;

        Ok(UserRecord {
            guid: guid.to_string(),
            sessions: rows
                .into_iter()
                .map(|(key, refresh_secret_hash, expires_at)| Session {
                    key,
                    refresh_secret_hash,
                    expires_at,
                })
                .collect(),
        })
    }

    async fn append_session(&self, guid: &str, session: Session) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_guid, key, refresh_secret_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(guid)
        .bind(&session.key)
        .bind(&session.refresh_secret_hash)
        .bind(session.expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn swap_session(
        &self,
        guid: &str,
        old_key: &str,
        replacement: Session,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET key = $1, refresh_secret_hash = $2, expires_at = $3
            WHERE user_guid = $4 AND key = $5 AND expires_at > now()
            "#,
        )
        .bind(&replacement.key)
        .bind(&replacement.refresh_secret_hash)
        .bind(replacement.expires_at)
        .bind(guid)
        .bind(old_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
