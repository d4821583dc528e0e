/// Session Store
///
/// Per-identity lookup plus session insertion and atomic rotation.
/// The authentication service depends only on this trait; Postgres backs
/// it in production, an in-memory map backs it in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresSessionStore;

/// One outstanding refresh credential belonging to an identity.
///
/// Never mutated after creation: rotation swaps in a whole replacement.
#[derive(Debug, Clone)]
pub struct Session {
    /// Correlation handle embedded in access tokens; not a secret
    pub key: String,
    /// One-way hash of the refresh secret issued for this session
    pub refresh_secret_hash: String,
    /// After this instant the session is no longer valid for refresh
    pub expires_at: DateTime<Utc>,
}

/// An identity and its live sessions.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub guid: String,
    pub sessions: Vec<Session>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch an identity and its unexpired sessions.
    ///
    /// # Errors
    /// `StorageError::NotFound` when the identity does not exist.
    async fn get_user(&self, guid: &str) -> Result<UserRecord, StorageError>;

    /// Append a new session to an identity's record.
    async fn append_session(&self, guid: &str, session: Session) -> Result<(), StorageError>;

    /// Atomically replace the unexpired session keyed by `old_key`.
    ///
    /// Returns `false` when no such session exists, which means it was
    /// already rotated away or has expired; the caller treats that as a
    /// validation failure, never as success.
    async fn swap_session(
        &self,
        guid: &str,
        old_key: &str,
        replacement: Session,
    ) -> Result<bool, StorageError>;
}
