//! Service configuration, read once from the environment at startup.
//!
//! `from_env` loads an optional `.env` file first; `from_lookup` takes any
//! variable source so tests never touch the process environment.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use catalog_observability::LogFormat;
use catalog_products::ImageUrls;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in {1} environment")]
    Missing(&'static str, Environment),

    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Environment::Development
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("expected s3|local|memory, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Base for derived image URLs (`<upload_url>/<file_name>`).
    pub upload_url: String,
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// `None` selects the in-memory metadata store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    pub bucket: String,
    pub region: Option<String>,
    /// Custom endpoint (MinIO, LocalStack); forces path-style addressing.
    pub endpoint: Option<String>,
    pub presign_expiration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3: Option<S3Config>,
    pub local_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub log_format: LogFormat,
}

const DEV_UPLOAD_URL: &str = "http://localhost:8080/uploads";
const DEFAULT_PRESIGN_SECS: u64 = 900;

impl CatalogConfig {
    /// Load from the process environment (after applying `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment: Environment = parse_or(&var, "APP_ENV", Environment::Development)?;

        let upload_url = match var("API_UPLOAD_URL") {
            Some(url) => url,
            None if environment.is_development() => DEV_UPLOAD_URL.to_string(),
            None => return Err(ConfigError::Missing("API_UPLOAD_URL", environment)),
        };

        let api = ApiConfig {
            host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&var, "API_PORT", 8080)?,
            upload_url,
        };

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 5)?,
            run_migrations: parse_bool_or(&var, "DB_RUN_MIGRATIONS", false)?,
        };

        let default_backend = if environment.is_development() {
            StorageBackend::Memory
        } else {
            StorageBackend::S3
        };
        let backend = parse_or(&var, "STORAGE_BACKEND", default_backend)?;

        let s3 = match (backend, var("AWS_S3_BUCKET_NAME")) {
            (_, Some(bucket)) => Some(S3Config {
                bucket,
                region: var("AWS_REGION"),
                endpoint: var("AWS_S3_ENDPOINT"),
                presign_expiration: Duration::from_secs(parse_or(
                    &var,
                    "AWS_S3_PRESIGN_EXPIRATION",
                    DEFAULT_PRESIGN_SECS,
                )?),
            }),
            (StorageBackend::S3, None) => {
                return Err(ConfigError::Missing("AWS_S3_BUCKET_NAME", environment));
            }
            (_, None) => None,
        };

        let storage = StorageConfig {
            backend,
            s3,
            local_dir: var("LOCAL_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
        };

        Ok(Self {
            environment,
            api,
            database,
            storage,
            log_format: parse_or(&var, "LOG_FORMAT", LogFormat::Json)?,
        })
    }

    pub fn image_urls(&self) -> ImageUrls {
        ImageUrls::new(self.api.upload_url.clone())
    }
}

fn parse_or<T, V>(var: &V, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool_or<V>(var: &V, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    V: Fn(&str) -> Option<String>,
{
    match var(name).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(value) => Err(ConfigError::Invalid {
            name,
            value,
            reason: "expected a boolean".to_string(),
        }),
    }
}
