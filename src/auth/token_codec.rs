/// Token Codec
///
/// Issues and verifies signed access tokens and generates the opaque
/// random strings used as session keys and refresh secrets.
///
/// Access tokens are HS512-signed JWTs. Parsing runs with an explicit
/// single-algorithm allow-list so a token carrying any other `alg` is
/// rejected outright, and with zero leeway so expiry is exact.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, TokenError};

/// Alphanumeric length of a session correlation key (~190 bits of entropy)
const SESSION_KEY_LENGTH: usize = 32;
/// Alphanumeric length of a refresh secret (~380 bits of entropy)
const REFRESH_SECRET_LENGTH: usize = 64;

/// Issue a signed access token bound to an identity and a session key.
///
/// # Errors
/// Returns `TokenError::Signing` only when the signing primitive fails;
/// never on business-logic conditions.
pub fn generate_access_token(
    guid: &str,
    session_key: &str,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(guid, session_key, config.access_token_expiry);

    encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Token(TokenError::Signing(e.to_string())))
}

/// Verify a token's signature and structure and extract its claims.
///
/// # Errors
/// - `TokenError::Expired` when the token is past its `exp`
/// - `TokenError::Invalid` for a bad signature, an algorithm outside the
///   allow-list, or absent/malformed claims
pub fn parse_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS512);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::Token(TokenError::Expired),
        _ => AppError::Token(TokenError::Invalid),
    })
}

/// Generate a new session correlation key.
///
/// Drawn from the thread-local CSPRNG; collision probability across the
/// lifetime of the system is negligible.
pub fn generate_session_key() -> String {
    random_alphanumeric(SESSION_KEY_LENGTH)
}

/// Generate a new opaque refresh secret.
///
/// The plaintext goes to the client; the server stores only its hash.
pub fn generate_refresh_secret() -> String {
    random_alphanumeric(REFRESH_SECRET_LENGTH)
}

fn random_alphanumeric(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
