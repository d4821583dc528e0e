/// In-memory session store
///
/// Backs unit and HTTP tests; also usable for local runs without
/// Postgres. One map guarded by one lock, so swap is trivially atomic.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::store::{Session, SessionStore, UserRecord};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, Vec<Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision an identity. Identities are created out of band in
    /// production; this is the test-side equivalent.
    pub fn add_user(&self, guid: &str) {
        self.users
            .write()
            .expect("session map lock poisoned")
            .entry(guid.to_string())
            .or_default();
    }

    /// Number of stored sessions for an identity, expired ones included.
    pub fn session_count(&self, guid: &str) -> usize {
        self.users
            .read()
            .expect("session map lock poisoned")
            .get(guid)
            .map(|sessions| sessions.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn get_user(&self, guid: &str) -> Result<UserRecord, StorageError> {
        let users = self.users.read().expect("session map lock poisoned");
        let sessions = users.get(guid).ok_or(StorageError::NotFound)?;

        let now = Utc::now();
        Ok(UserRecord {
            guid: guid.to_string(),
            sessions: sessions
                .iter()
                .filter(|s| s.expires_at > now)
                .cloned()
                .collect(),
        })
    }

    async fn append_session(&self, guid: &str, session: Session) -> Result<(), StorageError> {
        let mut users = self.users.write().expect("session map lock poisoned");
        let sessions = users.get_mut(guid).ok_or(StorageError::NotFound)?;
        sessions.push(session);
        Ok(())
    }

    async fn swap_session(
        &self,
        guid: &str,
        old_key: &str,
        replacement: Session,
    ) -> Result<bool, StorageError> {
        let mut users = self.users.write().expect("session map lock poisoned");
        let sessions = users.get_mut(guid).ok_or(StorageError::NotFound)?;

        let now = Utc::now();
        match sessions
            .iter_mut()
            .find(|s| s.key == old_key && s.expires_at > now)
        {
            Some(slot) => {
                *slot = replacement;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
