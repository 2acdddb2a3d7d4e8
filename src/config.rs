//! Configuration with validation at startup.

use std::time::Duration;

use clap::Parser;
use secrecy::{ExposeSecret, SecretString};

/// Minimum required JWT secret length (256 bits).
const MIN_JWT_SECRET_LEN: usize = 32;

/// Wardrobe backend configuration.
///
/// All values can be set via environment variables or CLI arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "closet-service", about = "Wardrobe social catalogue backend")]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "HTTP_ADDRESS", default_value = "0.0.0.0:8000")]
    pub http_address: String,

    /// CORS allowed origins (comma-separated, or "*" for any)
    #[arg(long, env = "CORS_ALLOW_ORIGINS")]
    pub cors_allow_origins: Option<String>,

    /// Shared secret used by the identity provider to sign bearer tokens (min 32 chars)
    #[arg(long, env = "JWT_SECRET_KEY")]
    pub jwt_secret_key: SecretString,

    /// Database connection URL
    #[arg(long, env = "DB_URL")]
    pub db_url: String,

    /// Database password (URL-encoded and inserted into DB_URL)
    #[arg(long, env = "DB_PASSWORD")]
    pub db_password: Option<String>,

    /// Database pool minimum connections
    #[arg(long, env = "DB_POOL_MIN", default_value = "2")]
    pub db_pool_min: u32,

    /// Database pool maximum connections
    #[arg(long, env = "DB_POOL_MAX", default_value = "10")]
    pub db_pool_max: u32,

    /// Database connection timeout in seconds
    #[arg(long, env = "DB_CONNECT_TIMEOUT", default_value = "30")]
    pub db_connect_timeout_secs: u64,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Use JSON log format
    #[arg(long, env = "JSON_LOGS", default_value_t = true, action = clap::ArgAction::Set)]
    pub json_logs: bool,

    /// Max image upload size in bytes (default: 8MB)
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "8388608")]
    pub max_upload_bytes: usize,

    /// Signed image URL validity in seconds (default: 1 year)
    #[arg(long, env = "SIGNED_URL_TTL_SECS", default_value = "31536000")]
    pub signed_url_ttl_secs: u64,

    /// S3 endpoint URL (e.g., http://localhost:9000/closet-images/)
    #[arg(long, env = "S3_URL")]
    pub s3_url: Option<String>,

    /// S3 access key ID
    #[arg(long, env = "S3_ACCESS_KEY_ID")]
    pub s3_access_key_id: Option<String>,

    /// S3 secret access key
    #[arg(long, env = "S3_SECRET_ACCESS_KEY")]
    pub s3_secret_access_key: Option<String>,
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT secret must be at least {MIN_JWT_SECRET_LEN} characters")]
    JwtSecretTooShort,
    #[error("Database pool max ({max}) must be >= min ({min})")]
    InvalidPoolSize { min: u32, max: u32 },
    #[error("Signed URL TTL must be > 0")]
    InvalidSignedUrlTtl,
    #[error("Max upload size must be > 0")]
    InvalidUploadLimit,
}

impl Config {
    /// Parse and validate configuration.
    pub fn init() -> anyhow::Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret_key.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::JwtSecretTooShort);
        }
        if self.db_pool_max < self.db_pool_min {
            return Err(ConfigError::InvalidPoolSize {
                min: self.db_pool_min,
                max: self.db_pool_max,
            });
        }
        if self.signed_url_ttl_secs == 0 {
            return Err(ConfigError::InvalidSignedUrlTtl);
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }
        Ok(())
    }

    /// Get database connection timeout as Duration.
    #[inline]
    pub const fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }

    /// Build the database URL with password substitution.
    pub fn database_url(&self) -> String {
        match &self.db_password {
            Some(password) => {
                let encoded = urlencoding::encode(password);
                self.db_url.replacen(":@", &format!(":{encoded}@"), 1)
            }
            None => self.db_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            http_address: "0.0.0.0:8000".to_string(),
            cors_allow_origins: None,
            jwt_secret_key: SecretString::from("this_is_a_very_long_secret_key_32"),
            db_url: "postgres://closet:@localhost/closet".to_string(),
            db_password: Some("secret".to_string()),
            db_pool_min: 2,
            db_pool_max: 10,
            db_connect_timeout_secs: 30,
            log_level: "INFO".to_string(),
            json_logs: false,
            max_upload_bytes: 8 * 1024 * 1024,
            signed_url_ttl_secs: 31_536_000,
            s3_url: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn database_url_substitutes_password() {
        let config = test_config();
        assert!(config.database_url().contains(":secret@"));
    }

    #[test]
    fn database_url_encodes_special_characters() {
        let mut config = test_config();
        config.db_password = Some("p@ss/word".to_string());
        assert!(config.database_url().contains(":p%40ss%2Fword@"));
    }

    #[test]
    fn jwt_secret_too_short_fails() {
        let mut config = test_config();
        config.jwt_secret_key = SecretString::from("short");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JwtSecretTooShort)
        ));
    }

    #[test]
    fn invalid_pool_size_fails() {
        let mut config = test_config();
        config.db_pool_min = 10;
        config.db_pool_max = 5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPoolSize { .. })
        ));
    }

    #[test]
    fn zero_signed_url_ttl_fails() {
        let mut config = test_config();
        config.signed_url_ttl_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSignedUrlTtl)
        ));
    }
}
