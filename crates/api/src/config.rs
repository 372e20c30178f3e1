use crm_core::storage::{StorageBackendType, DEFAULT_CUSTOMER_BUCKET};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Object storage backend and bucket.
    pub storage: StorageConfig,
    /// Insert one random customer at startup (default: `false`).
    pub seed_random_customer: bool,
}

/// Where profile images are kept.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackendType,
    /// Bucket holding customer objects.
    pub customer_bucket: String,
    /// AWS region for the S3 backend.
    pub region: String,
    /// Custom S3 endpoint (MinIO, LocalStack).
    pub endpoint: Option<String>,
    /// Root directory for the local backend.
    pub local_root: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SEED_RANDOM_CUSTOMER` | `false`                    |
    ///
    /// See [`JwtConfig::from_env`] and [`StorageConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let seed_random_customer: bool = std::env::var("SEED_RANDOM_CUSTOMER")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("SEED_RANDOM_CUSTOMER must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            storage: StorageConfig::from_env(),
            seed_random_customer,
        }
    }
}

impl StorageConfig {
    /// | Env Var              | Default               |
    /// |----------------------|-----------------------|
    /// | `STORAGE_BACKEND`    | `s3`                  |
    /// | `CUSTOMER_BUCKET`    | `fileupload-customer` |
    /// | `AWS_REGION`         | `eu-west-1`           |
    /// | `S3_ENDPOINT`        | unset                 |
    /// | `LOCAL_STORAGE_ROOT` | `./storage`           |
    pub fn from_env() -> Self {
        let backend_name = std::env::var("STORAGE_BACKEND").unwrap_or_else(|_| "s3".into());
        let backend = StorageBackendType::from_name(&backend_name)
            .unwrap_or_else(|e| panic!("Invalid STORAGE_BACKEND: {e}"));

        Self {
            backend,
            customer_bucket: std::env::var("CUSTOMER_BUCKET")
                .unwrap_or_else(|_| DEFAULT_CUSTOMER_BUCKET.into()),
            region: std::env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".into()),
            endpoint: std::env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            local_root: std::env::var("LOCAL_STORAGE_ROOT").unwrap_or_else(|_| "./storage".into()),
        }
    }
}
