//! Startup configuration read from the environment.

use std::fmt;

use crate::db::DbConfig;

pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://example.com/downloads";
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("environment variable {name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// How the admin password was supplied.
#[derive(Clone, PartialEq, Eq)]
pub enum AdminPassword {
    Plain(String),
    Hashed(String),
}

impl fmt::Debug for AdminPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminPassword::Plain(_) => f.write_str("Plain(***)"),
            AdminPassword::Hashed(_) => f.write_str("Hashed(***)"),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database: DbConfig,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: AdminPassword,
    pub bcrypt_cost: u32,
    pub host: String,
    pub port: u16,
    pub download_base_url: String,
    pub max_body_bytes: usize,
    /// Comma-separated CORS origins; `None` allows any origin.
    pub allowed_origins: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database.redacted_url())
            .field("jwt_secret", &"***")
            .field("admin_username", &self.admin_username)
            .field("admin_password", &self.admin_password)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("download_base_url", &self.download_base_url)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("allowed_origins", &self.allowed_origins)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Empty values count
    /// as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let mut database = DbConfig::new(require("DATABASE_URL")?);
        let jwt_secret = require("JWT_SECRET")?;
        let admin_username = require("ADMIN_USERNAME")?;
        let admin_password = match (get("ADMIN_PASSWORD"), get("ADMIN_PASSWORD_HASH")) {
            (_, Some(hash)) => AdminPassword::Hashed(hash),
            (Some(plain), None) => AdminPassword::Plain(plain),
            (None, None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
        };

        let parse = |name: &'static str| -> Result<Option<u64>, ConfigError> {
            get(name)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::Invalid { name, value })
                })
                .transpose()
        };

        if let Some(v) = parse("DB_POOL_MAX")? {
            database.max_connections = narrow("DB_POOL_MAX", v)?;
        }
        if let Some(v) = parse("DB_POOL_MIN")? {
            database.min_connections = narrow("DB_POOL_MIN", v)?;
        }
        if let Some(v) = parse("DB_CONNECT_TIMEOUT")? {
            database.connect_timeout_secs = v;
        }
        if let Some(v) = parse("DB_IDLE_TIMEOUT")? {
            database.idle_timeout_secs = v;
        }

        let bcrypt_cost = match parse("BCRYPT_COST")? {
            Some(v) => narrow("BCRYPT_COST", v)?,
            None => bcrypt::DEFAULT_COST,
        };
        let port = match parse("PORT")? {
            Some(v) => narrow("PORT", v)?,
            None => 3001,
        };
        let max_body_bytes = match parse("MAX_BODY_BYTES")? {
            Some(v) => narrow("MAX_BODY_BYTES", v)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            database,
            jwt_secret,
            admin_username,
            admin_password,
            bcrypt_cost,
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            download_base_url: get("FILES_DOWNLOAD_BASE_URL")
                .unwrap_or_else(|| DEFAULT_DOWNLOAD_BASE_URL.to_string()),
            max_body_bytes,
            allowed_origins: get("ALLOWED_ORIGINS"),
        })
    }
}

fn narrow<T: TryFrom<u64>>(name: &'static str, value: u64) -> Result<T, ConfigError> {
    T::try_from(value).map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
