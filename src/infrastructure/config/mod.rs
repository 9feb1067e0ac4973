use serde::Deserialize;
use std::env;

/// Upper bound for either token lifetime
pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// PostgreSQL URL for the refresh token store; in-memory store when unset
    pub database_url: Option<String>,
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub access_token_expiration_minutes: i64,
    pub refresh_token_expiration_days: i64,
    pub environment: Environment,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptySecret(&'static str),
    #[error("ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ")]
    SharedSecret,
    #[error("{0} must be positive")]
    NonPositiveTtl(&'static str),
    #[error("{0} exceeds the maximum token lifetime")]
    TtlOutOfRange(&'static str),
    #[error("access token lifetime must be shorter than refresh token lifetime")]
    TtlOrder,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            access_token_secret: env::var("ACCESS_TOKEN_SECRET")
                .map_err(|_| "ACCESS_TOKEN_SECRET is not set")?,
            refresh_token_secret: env::var("REFRESH_TOKEN_SECRET")
                .map_err(|_| "REFRESH_TOKEN_SECRET is not set")?,
            access_token_expiration_minutes: env::var("ACCESS_TOKEN_EXPIRATION_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            refresh_token_expiration_days: env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Start-up preconditions on secrets and token lifetimes
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.is_empty() {
            return Err(ConfigError::EmptySecret("ACCESS_TOKEN_SECRET"));
        }
        if self.refresh_token_secret.is_empty() {
            return Err(ConfigError::EmptySecret("REFRESH_TOKEN_SECRET"));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::SharedSecret);
        }
        if self.access_token_expiration_minutes <= 0 {
            return Err(ConfigError::NonPositiveTtl("ACCESS_TOKEN_EXPIRATION_MINUTES"));
        }
        if self.refresh_token_expiration_days <= 0 {
            return Err(ConfigError::NonPositiveTtl("REFRESH_TOKEN_EXPIRATION_DAYS"));
        }
        if self.refresh_token_expiration_days > MAX_TOKEN_LIFETIME_DAYS {
            return Err(ConfigError::TtlOutOfRange("REFRESH_TOKEN_EXPIRATION_DAYS"));
        }

        let refresh_minutes = self
            .refresh_token_expiration_days
            .checked_mul(24 * 60)
            .ok_or(ConfigError::TtlOutOfRange("REFRESH_TOKEN_EXPIRATION_DAYS"))?;
        if self.access_token_expiration_minutes >= refresh_minutes {
            return Err(ConfigError::TtlOrder);
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
