//! API configuration

use serde::Deserialize;

use infra_db::WrappersConfig;

/// API configuration
///
/// Loaded from `API_`-prefixed environment variables. Nested billing
/// settings use a double underscore, e.g. `API_BILLING__API_KEY_ID`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub database_max_connections: u32,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Direct billing integration settings
    pub billing: WrappersConfig,
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/billing".to_string(),
            database_max_connections: 10,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            billing: WrappersConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(
            config::Environment::with_prefix("API")
                .prefix_separator("_")
                .separator("__"),
        )
    }

    /// Loads configuration from any `config` source
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
