//! Configuration module
//!
//! Remote store credentials, legacy media location, database and migration
//! settings. Values come from the process environment (optionally a `.env`
//! file) and are passed explicitly into the components that need them.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

const API_BASE_URL: &str = "https://api.cloudinary.com";
const DELIVERY_BASE_URL: &str = "https://res.cloudinary.com";
const HTTP_TIMEOUT_SECS: u64 = 60;
const MEDIA_URL: &str = "/media/";
const MEDIA_ROOT: &str = "./media";
const DB_MAX_CONNECTIONS: u32 = 5;
const MAX_UPLOAD_ATTEMPTS: u32 = 1;
const RETRY_BACKOFF_SECS: u64 = 2;

/// Remote asset store account and endpoints.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    pub timeout_secs: u64,
}

impl Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("delivery_base_url", &self.delivery_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl CloudinaryConfig {
    /// Config with default endpoints, for callers that already hold credentials.
    pub fn new(cloud_name: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
            api_base_url: API_BASE_URL.to_string(),
            delivery_base_url: DELIVERY_BASE_URL.to_string(),
            timeout_secs: HTTP_TIMEOUT_SECS,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cloud_name.is_empty() || self.cloud_name.contains('/') {
            return Err(ConfigError::invalid(
                "CLOUDINARY_CLOUD_NAME",
                "must be a non-empty name without '/'",
            ));
        }
        for (var, url) in [
            ("CLOUDINARY_API_BASE_URL", &self.api_base_url),
            ("CLOUDINARY_DELIVERY_BASE_URL", &self.delivery_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid(var, "must be an http(s) URL"));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "CLOUDINARY_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Where legacy files live and how they were served.
#[derive(Clone, Debug)]
pub struct LegacyMediaConfig {
    /// Base URL the legacy files were served under, e.g. `/media/`.
    pub media_url: String,
    /// Directory holding the legacy files.
    pub media_root: PathBuf,
}

#[derive(Clone, Debug)]
pub struct MigrationSettings {
    pub max_upload_attempts: u32,
    pub retry_backoff_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub cloudinary: CloudinaryConfig,
    pub media: LegacyMediaConfig,
    pub migration: MigrationSettings,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let from_url = match get("CLOUDINARY_URL") {
            Some(url) => Some(parse_cloudinary_url(&url)?),
            None => None,
        };
        let (url_cloud, url_key, url_secret) = match from_url {
            Some((cloud, key, secret)) => (Some(cloud), Some(key), Some(secret)),
            None => (None, None, None),
        };

        let cloudinary = CloudinaryConfig {
            cloud_name: get("CLOUDINARY_CLOUD_NAME")
                .or(url_cloud)
                .ok_or_else(|| ConfigError::Missing("CLOUDINARY_CLOUD_NAME".to_string()))?,
            api_key: get("CLOUDINARY_API_KEY")
                .or(url_key)
                .ok_or_else(|| ConfigError::Missing("CLOUDINARY_API_KEY".to_string()))?,
            api_secret: get("CLOUDINARY_API_SECRET")
                .or(url_secret)
                .ok_or_else(|| ConfigError::Missing("CLOUDINARY_API_SECRET".to_string()))?,
            api_base_url: get("CLOUDINARY_API_BASE_URL")
                .unwrap_or_else(|| API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            delivery_base_url: get("CLOUDINARY_DELIVERY_BASE_URL")
                .unwrap_or_else(|| DELIVERY_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            timeout_secs: parse_or(&get, "CLOUDINARY_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
        };

        let media = LegacyMediaConfig {
            media_url: get("MEDIA_URL").unwrap_or_else(|| MEDIA_URL.to_string()),
            media_root: PathBuf::from(get("MEDIA_ROOT").unwrap_or_else(|| MEDIA_ROOT.to_string())),
        };

        let migration = MigrationSettings {
            max_upload_attempts: parse_or(
                &get,
                "MIGRATION_MAX_UPLOAD_ATTEMPTS",
                MAX_UPLOAD_ATTEMPTS,
            )?,
            retry_backoff_secs: parse_or(&get, "MIGRATION_RETRY_BACKOFF_SECS", RETRY_BACKOFF_SECS)?,
        };

        let config = Config {
            cloudinary,
            media,
            migration,
            database_url: get("DATABASE_URL"),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cloudinary.validate()?;

        if self.migration.max_upload_attempts == 0 {
            return Err(ConfigError::invalid(
                "MIGRATION_MAX_UPLOAD_ATTEMPTS",
                "must be at least 1",
            ));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::invalid(
                "DB_MAX_CONNECTIONS",
                "must be greater than zero",
            ));
        }

        if let Some(url) = &self.database_url {
            if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
                return Err(ConfigError::invalid(
                    "DATABASE_URL",
                    "must be a PostgreSQL connection string",
                ));
            }
        }

        Ok(())
    }

    /// Database URL, required by commands that touch records.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))
    }

    pub fn media_url(&self) -> &str {
        &self.media.media_url
    }
}

/// Parse `cloudinary://<api_key>:<api_secret>@<cloud_name>` into
/// `(cloud_name, api_key, api_secret)`. Query parameters are ignored.
fn parse_cloudinary_url(url: &str) -> Result<(String, String, String), ConfigError> {
    let invalid = || {
        ConfigError::invalid(
            "CLOUDINARY_URL",
            "expected cloudinary://<api_key>:<api_secret>@<cloud_name>",
        )
    };

    let rest = url.trim().strip_prefix("cloudinary://").ok_or_else(invalid)?;
    let rest = rest.split('?').next().unwrap_or_default();
    let (credentials, cloud_name) = rest.rsplit_once('@').ok_or_else(invalid)?;
    let (api_key, api_secret) = credentials.split_once(':').ok_or_else(invalid)?;

    if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
        return Err(invalid());
    }

    Ok((
        cloud_name.trim_end_matches('/').to_string(),
        api_key.to_string(),
        api_secret.to_string(),
    ))
}

fn parse_or<T, F>(get: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid(var, format!("cannot parse '{}'", value))),
        None => Ok(default),
    }
}
