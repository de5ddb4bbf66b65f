//! Application-level configuration loaded from the environment.

use std::env;

use anyhow::Context;

/// Environment variable holding the MongoDB connection string.
const MONGO_URI_ENV: &str = "MONGO_URI";
/// Environment variable overriding the database name baked into the URI.
const MONGO_DB_ENV: &str = "MONGO_DB";
/// Primary environment variable for the HTTP listen port.
const PORT_ENV: &str = "PORT";
/// Fallback environment variable for the HTTP listen port.
const SERVER_PORT_ENV: &str = "SERVER_PORT";
/// Environment variable holding the shared token-signing secret.
const JWT_SECRET_ENV: &str = "JWT_SECRET";

/// Connection string used when [`MONGO_URI_ENV`] is absent.
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
/// Listen port used when neither port variable is set.
const DEFAULT_PORT: u16 = 8080;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Optional database name override.
    pub mongo_db: Option<String>,
    /// HTTP listen port.
    pub port: u16,
    /// Secret used to verify access tokens minted by the account service.
    pub jwt_secret: Vec<u8>,
}

impl AppConfig {
    /// Read the configuration from the environment.
    ///
    /// Everything has a development default except the token secret, which
    /// must be provided explicitly.
    pub fn from_env() -> anyhow::Result<Self> {
        let mongo_uri = env::var(MONGO_URI_ENV).unwrap_or_else(|_| DEFAULT_MONGO_URI.into());
        let mongo_db = env::var(MONGO_DB_ENV).ok();

        let port = env::var(PORT_ENV)
            .or_else(|_| env::var(SERVER_PORT_ENV))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = env::var(JWT_SECRET_ENV)
            .with_context(|| format!("{JWT_SECRET_ENV} must be set"))?
            .into_bytes();

        Ok(Self {
            mongo_uri,
            mongo_db,
            port,
            jwt_secret,
        })
    }
}
