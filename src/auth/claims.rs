/// Access-token claims
///
/// Payload of a signed access token: the subject identity, the session
/// correlation key, and standard timestamp claims (RFC 7519).

use serde::{Deserialize, Serialize};

/// Claims carried by every access token.
///
/// `key` is the correlation handle of the session the token was issued
/// against. It is embedded unencrypted and is not a secret.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (client GUID, opaque)
    pub sub: String,
    /// Session correlation key
    pub key: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Create new claims bound to an identity and a session key.
    pub fn new(guid: &str, session_key: &str, expiry_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: guid.to_string(),
            key: session_key.to_string(),
            exp: now + expiry_seconds,
            iat: now,
        }
    }

    /// Check if the token has expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
