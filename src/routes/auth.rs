/// Authentication Routes
///
/// Sign-in by GUID and refresh-rotation. The refresh secret crosses the
/// wire base64-encoded; encoding on the way out and decoding on the way
/// in happen here, so the service only ever sees the raw secret.

use actix_web::{web, HttpResponse};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthenticationService, Tokens};
use crate::error::AppError;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub guid: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

/// Response carrying a freshly issued credential pair
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    fn new(tokens: Tokens, expires_in: i64) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: BASE64.encode(tokens.refresh_token.as_bytes()),
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

/// POST /auth/sign-in
///
/// Issue an initial credential pair for an identity.
///
/// # Errors
/// - 404: identity unknown to the session store
/// - 500: internal failure
pub async fn sign_in(
    form: web::Json<SignInRequest>,
    service: web::Data<AuthenticationService>,
) -> Result<HttpResponse, AppError> {
    let tokens = service.sign_in(&form.guid).await?;

    Ok(HttpResponse::Ok().json(TokenResponse::new(
        tokens,
        service.access_token_expiry(),
    )))
}

/// POST /auth/refresh
///
/// Exchange a valid (access token, refresh secret) pair for a new pair.
/// The old pair is consumed; presenting it again is a validation error.
///
/// # Errors
/// - 400: undecodable refresh secret, or any session/secret mismatch
/// - 401: invalid or expired access token
/// - 404: token subject unknown to the session store
/// - 500: internal failure
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    service: web::Data<AuthenticationService>,
) -> Result<HttpResponse, AppError> {
    let decoded = BASE64
        .decode(form.refresh_token.as_bytes())
        .map_err(|_| AppError::Validation)?;
    let refresh_secret = String::from_utf8(decoded).map_err(|_| AppError::Validation)?;

    let tokens = service
        .refresh_tokens(&form.access_token, &refresh_secret)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::new(
        tokens,
        service.access_token_expiry(),
    )))
}
