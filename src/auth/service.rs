/// Authentication Service
///
/// Orchestrates sign-in and refresh-rotation over the token codec, the
/// secret hasher, and the session store. Holds no mutable state of its
/// own; any number of instances and concurrent calls are safe.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::auth::secret_hasher::{hash_secret, verify_secret, DUMMY_SECRET_HASH};
use crate::auth::token_codec::{
    generate_access_token, generate_refresh_secret, generate_session_key, parse_access_token,
};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::{Session, SessionStore};

/// Response DTO: one freshly issued credential pair.
///
/// `refresh_token` is the plaintext secret; only its hash is stored
/// server-side. Base64 framing is the HTTP boundary's concern.
#[derive(Debug, Serialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn SessionStore>,
    jwt: JwtSettings,
}

impl AuthenticationService {
    pub fn new(store: Arc<dyn SessionStore>, jwt: JwtSettings) -> Self {
        Self { store, jwt }
    }

    /// Access-token lifetime in seconds, for `expires_in` response fields.
    pub fn access_token_expiry(&self) -> i64 {
        self.jwt.access_token_expiry
    }

    /// Issue an initial credential pair for an identity.
    ///
    /// Identity possession is assumed established by the caller; no
    /// credential is checked here.
    ///
    /// # Errors
    /// `AppError::UserNotFound` when the identity is absent from the store.
    pub async fn sign_in(&self, guid: &str) -> Result<Tokens, AppError> {
        let user = self.store.get_user(guid).await?;

        let (session, tokens) = self.mint_session(&user.guid)?;
        self.store.append_session(&user.guid, session).await?;

        tracing::info!(guid = %user.guid, "issued initial credential pair");

        Ok(tokens)
    }

    /// Redeem a valid (access token, refresh secret) pair for a new pair.
    ///
    /// Rotation is destructive: the consumed session is atomically
    /// replaced, so a redeemed refresh secret is single-use. Replays,
    /// forged session keys, and tampered secrets all fail with the one
    /// uniform `AppError::Validation`.
    ///
    /// # Errors
    /// - token parse failures propagate unchanged (`Invalid` / `Expired`)
    /// - `AppError::UserNotFound` when the subject is absent
    /// - `AppError::Validation` for every session/secret mismatch
    pub async fn refresh_tokens(
        &self,
        access_token: &str,
        refresh_secret: &str,
    ) -> Result<Tokens, AppError> {
        let claims = parse_access_token(access_token, &self.jwt)?;
        let user = self.store.get_user(&claims.sub).await?;

        let matched = match user.sessions.iter().find(|s| s.key == claims.key) {
            Some(session) => verify_secret(refresh_secret, &session.refresh_secret_hash),
            None => {
                // Burn a comparison anyway so this path is not cheaper
                // than a hash mismatch.
                let _ = verify_secret(refresh_secret, DUMMY_SECRET_HASH);
                false
            }
        };
        if !matched {
            return Err(AppError::Validation);
        }

        let (session, tokens) = self.mint_session(&user.guid)?;
        let swapped = self
            .store
            .swap_session(&user.guid, &claims.key, session)
            .await?;
        if !swapped {
            // A concurrent refresh already consumed this session.
            return Err(AppError::Validation);
        }

        tracing::info!(guid = %user.guid, "rotated session");

        Ok(tokens)
    }

    /// Mint a new session and its credential pair, without persisting.
    fn mint_session(&self, guid: &str) -> Result<(Session, Tokens), AppError> {
        let key = generate_session_key();
        let refresh_secret = generate_refresh_secret();
        let refresh_secret_hash = hash_secret(&refresh_secret)?;
        let access_token = generate_access_token(guid, &key, &self.jwt)?;

        let session = Session {
            key,
            refresh_secret_hash,
            expires_at: Utc::now() + Duration::seconds(self.jwt.refresh_token_expiry),
        };
        let tokens = Tokens {
            access_token,
            refresh_token: refresh_secret,
        };

        Ok((session, tokens))
    }
}
