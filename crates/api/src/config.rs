use std::path::PathBuf;

use pitchdeck_core::upload::MAX_IMAGE_BYTES;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
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
    /// PostgreSQL URL. Without it slides are kept in memory.
    pub database_url: Option<String>,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// Directory of compiled client assets.
    pub static_dir: PathBuf,
    /// Upload size limit in bytes.
    pub max_upload_bytes: usize,
    /// JSON file replacing the embedded slide catalog.
    pub deck_catalog_path: Option<PathBuf>,
    /// Deployment environment name (default: `development`).
    pub app_env: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    /// | `UPLOAD_DIR`           | `public/uploads`           |
    /// | `STATIC_DIR`           | `public`                   |
    /// | `MAX_UPLOAD_BYTES`     | `5242880`                  |
    /// | `DECK_CATALOG_PATH`    | unset (embedded catalog)   |
    /// | `APP_ENV`              | `development`              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .map(|v| v.parse().expect("MAX_UPLOAD_BYTES must be a valid usize"))
            .unwrap_or(MAX_IMAGE_BYTES);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url: optional_var("DATABASE_URL"),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "public/uploads".into())
                .into(),
            static_dir: std::env::var("STATIC_DIR")
                .unwrap_or_else(|_| "public".into())
                .into(),
            max_upload_bytes,
            deck_catalog_path: optional_var("DECK_CATALOG_PATH").map(PathBuf::from),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }
}

/// An env var that counts as unset when empty.
fn optional_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
