use std::env;
use std::fmt;
use std::net::IpAddr;

use url::Url;

const DEFAULT_PORT: &str = "4000";
const DEFAULT_MAX_PORT_RETRIES: &str = "10";
const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "https://educational-platform-16.vercel.app",
    "http://localhost:3000",
    "http://localhost:3001",
];

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub cors: CorsConfig,
    pub database: Option<DatabaseConfig>,
    pub media: MediaStorage,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let max_port_retries = env::var("APP_MAX_PORT_RETRIES")
            .unwrap_or_else(|_| DEFAULT_MAX_PORT_RETRIES.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidRetryLimit)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors = match env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => CorsConfig::from_list(&raw),
            Err(_) => CorsConfig::default(),
        };

        let database = match env::var("MONGODB_URL") {
            Ok(raw) => Some(DatabaseConfig::parse(&raw)?),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig {
                host,
                port,
                max_port_retries,
            },
            telemetry: TelemetryConfig { log_level },
            cors,
            database,
            media: MediaStorage::from_env(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    /// Preferred port; the listener bootstrap walks upward from here when it is taken.
    pub port: u16,
    pub max_port_retries: u16,
}

impl ServerConfig {
    pub fn ip_addr(&self) -> Result<IpAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(IpAddr::from([127, 0, 0, 1]));
        }

        self.host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Browser origins allowed to call the API with credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    fn from_list(raw: &str) -> Self {
        let allowed_origins = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();
        Self { allowed_origins }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Connection settings for the document database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Url,
}

impl DatabaseConfig {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw.trim())
            .map_err(|source| ConfigError::InvalidDatabaseUrl { source })?;
        Ok(Self { url })
    }

    /// Host portion of the URL, safe to log (credentials are never included).
    pub fn redacted_target(&self) -> String {
        let host = self.url.host_str().unwrap_or("unknown-host");
        match self.url.port() {
            Some(port) => format!("{}://{host}:{port}", self.url.scheme()),
            None => format!("{}://{host}", self.url.scheme()),
        }
    }
}

/// Credentials for the hosted media store used for thumbnails and lecture videos.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaStorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Media storage never blocks startup: missing or partial credentials only disable it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaStorage {
    Disabled,
    Incomplete { missing: Vec<&'static str> },
    Configured(MediaStorageConfig),
}

impl MediaStorage {
    /// Reads `CLOUD_NAME`, `API_KEY` and `API_SECRET`.
    pub fn from_env() -> Self {
        let cloud_name = env::var("CLOUD_NAME").ok();
        let api_key = env::var("API_KEY").ok();
        let api_secret = env::var("API_SECRET").ok();

        match (cloud_name, api_key, api_secret) {
            (Some(cloud_name), Some(api_key), Some(api_secret)) => {
                Self::Configured(MediaStorageConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                })
            }
            (None, None, None) => Self::Disabled,
            (cloud_name, api_key, api_secret) => {
                let missing = [
                    ("CLOUD_NAME", cloud_name.is_none()),
                    ("API_KEY", api_key.is_none()),
                    ("API_SECRET", api_secret.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, absent)| absent.then_some(key))
                .collect();
                Self::Incomplete { missing }
            }
        }
    }
}

impl fmt::Debug for MediaStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStorageConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidRetryLimit,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDatabaseUrl { source: url::ParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid u16"),
            ConfigError::InvalidRetryLimit => {
                write!(f, "APP_MAX_PORT_RETRIES must be a valid u16")
            }
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDatabaseUrl { .. } => {
                write!(f, "MONGODB_URL must be a valid connection URL")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidRetryLimit => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidDatabaseUrl { source } => Some(source),
        }
    }
}
