//! Configuration module
//!
//! Configuration is read once at process start from the environment (and an optional
//! `.env` file). It is immutable afterwards; the trust sets derived from it are shared
//! by reference with every guard.

use std::env;

use crate::constants::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_UPLOAD_URL_TTL_SECS};

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 4000;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

const PROD_ORIGINS: &str = "https://proingup.com,https://www.proingup.com";
const PROD_HOSTS: &str = "proingup.com,www.proingup.com";
const DEV_ORIGINS: &str = "http://localhost:5173,http://localhost:4173";
const DEV_HOSTS: &str = "localhost:5173,localhost:4173";
const SESSION_COOKIE_NAME: &str = "sb-access-token";

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub log_format: String,
    pub http_concurrency_limit: usize,
    // Database
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Trust policy
    pub allowed_origins: Vec<String>,
    pub trusted_hosts: Vec<String>,
    pub dev_origins: Vec<String>,
    pub dev_hosts: Vec<String>,
    pub csrf_exempt_paths: Vec<String>,
    // Identity provider
    pub identity_url: String,
    pub identity_anon_key: String,
    pub identity_service_role_key: String,
    pub session_cookie_name: String,
    // Object storage
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    // Uploads
    pub max_upload_bytes: u64,
    pub upload_url_ttl_secs: u64,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("{} must be set", key))
        };

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let config = Config {
            environment,
            server_port: get("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            log_format: get("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
            http_concurrency_limit: get("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            database_url: required("DATABASE_URL")?,
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: get("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            allowed_origins: split_list(
                &get("ALLOWED_ORIGINS").unwrap_or_else(|| PROD_ORIGINS.to_string()),
            ),
            trusted_hosts: split_list(
                &get("TRUSTED_HOSTS").unwrap_or_else(|| PROD_HOSTS.to_string()),
            ),
            dev_origins: split_list(&get("DEV_ORIGINS").unwrap_or_else(|| DEV_ORIGINS.to_string())),
            dev_hosts: split_list(&get("DEV_HOSTS").unwrap_or_else(|| DEV_HOSTS.to_string())),
            csrf_exempt_paths: get("CSRF_EXEMPT_PATHS")
                .map(|s| split_list(&s))
                .unwrap_or_default(),
            identity_url: required("IDENTITY_URL")?
                .trim_end_matches('/')
                .to_string(),
            identity_anon_key: required("IDENTITY_ANON_KEY")?,
            identity_service_role_key: required("IDENTITY_SERVICE_ROLE_KEY")?,
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| SESSION_COOKIE_NAME.to_string()),
            s3_bucket: required("S3_BUCKET")?,
            s3_region: get("S3_REGION").unwrap_or_else(|| "auto".to_string()),
            s3_endpoint: get("S3_ENDPOINT"),
            max_upload_bytes: get("MAX_UPLOAD_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            upload_url_ttl_secs: get("UPLOAD_URL_TTL_SECS")
                .map(|s| {
                    s.parse()
                        .map_err(|_| anyhow::anyhow!("UPLOAD_URL_TTL_SECS must be a valid number"))
                })
                .transpose()?
                .unwrap_or(DEFAULT_UPLOAD_URL_TTL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.allowed_origins.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_ORIGINS must list at least one origin"));
        }

        if self.trusted_hosts.is_empty() {
            return Err(anyhow::anyhow!("TRUSTED_HOSTS must list at least one host"));
        }

        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !(self.identity_url.starts_with("https://") || self.identity_url.starts_with("http://"))
        {
            return Err(anyhow::anyhow!("IDENTITY_URL must be an http(s) URL"));
        }

        if self.upload_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_URL_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }
}
