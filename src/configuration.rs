use config::ConfigError;

use crate::error::{AppError, SettingsError};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Token issuance settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_expiry: i64,  // seconds (e.g., 900 for 15 minutes)
    pub refresh_token_expiry: i64, // seconds (e.g., 604800 for 7 days)
}

impl JwtSettings {
    /// Validate the signing material before the server starts.
    ///
    /// The access tokens are signed with an HMAC-class algorithm, so the
    /// secret must carry at least 256 bits.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.secret.len() < 32 {
            return Err(AppError::Settings(SettingsError::InvalidValue(
                "jwt.secret must be at least 32 bytes".to_string(),
            )));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(AppError::Settings(SettingsError::InvalidValue(
                "token expiries must be positive".to_string(),
            )));
        }
        Ok(())
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}
