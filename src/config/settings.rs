//! Application settings read from the environment (`.env` honoured).

use crate::error::ConfigError;

pub const DEFAULT_APP_NAME: &str = "Dynamic CRUD API";
pub const DEFAULT_APP_VERSION: &str = "1.0.0";
pub const DEFAULT_PORT: u16 = 6173;
pub const DEFAULT_BASE_URL: &str = "https://example.com";
pub const DEFAULT_DOCS_PREFIX: &str = "/api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub port: u16,
    /// Production server URL listed in the document.
    pub base_url: String,
    /// PostgreSQL connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// Prefix on documented paths and on the mount point of the CRUD router.
    pub docs_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            port: DEFAULT_PORT,
            base_url: DEFAULT_BASE_URL.to_string(),
            database_url: None,
            docs_prefix: DEFAULT_DOCS_PREFIX.to_string(),
        }
    }
}

impl Settings {
    /// `APP_NAME`, `APP_VERSION`, `APP_PORT`, `APP_BASE_URL`, `APP_DSN`, `APP_DOCS_PREFIX`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let port = match var("APP_PORT") {
            Some(p) => p
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::Env(format!("APP_PORT={}: {}", p, e)))?,
            None => defaults.port,
        };
        let docs_prefix = match var("APP_DOCS_PREFIX") {
            Some(p) => normalize_prefix(&p),
            None => defaults.docs_prefix,
        };
        Ok(Settings {
            app_name: var("APP_NAME").unwrap_or(defaults.app_name),
            app_version: var("APP_VERSION").unwrap_or(defaults.app_version),
            port,
            base_url: var("APP_BASE_URL").unwrap_or(defaults.base_url),
            database_url: var("APP_DSN"),
            docs_prefix,
        })
    }

    pub fn development_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }
}

/// Leading slash, no trailing slash; `/` alone becomes the empty prefix.
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
