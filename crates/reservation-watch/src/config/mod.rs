use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Page the checker scrapes when `RESERVATION_PAGE_URL` is not set.
pub const DEFAULT_RESERVATION_PAGE_URL: &str =
    "https://www.nps.gov/yose/planyourvisit/reservations.htm";
pub const DEFAULT_SENDGRID_API_BASE: &str = "https://api.sendgrid.com";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

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

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Credential wrapper that keeps secrets out of `Debug` output and logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub email: EmailConfig,
    pub source: SourceConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Loads the full service configuration. The session secret, database URL,
    /// admin password, and email provider credentials have no defaults.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let session_ttl = parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL.as_secs())?;
        if session_ttl == 0 || session_ttl > MAX_SESSION_TTL.as_secs() {
            return Err(ConfigError::InvalidSessionTtl);
        }
        let session = SessionConfig {
            secret: Secret::new(required("SESSION_SECRET")?),
            admin_password: Secret::new(required("ADMIN_PASSWORD")?),
            ttl: Duration::from_secs(session_ttl),
        };

        let database = DatabaseConfig {
            url: Secret::new(required("DATABASE_URL")?),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10)?,
        };

        let email = EmailConfig {
            api_key: Secret::new(required("SENDGRID_API_KEY")?),
            verified_sender: required("SENDGRID_VERIFIED_SENDER")?,
            api_base: env::var("SENDGRID_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SENDGRID_API_BASE.to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig::from_env(),
            database,
            session,
            email,
            source: SourceConfig::from_env()?,
            monitor: MonitorConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret,
    pub max_connections: u32,
}

/// Admin session signing and login settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Secret,
    pub admin_password: Secret,
    pub ttl: Duration,
}

/// Transactional email provider credentials.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: Secret,
    pub verified_sender: String,
    pub api_base: String,
}

/// Where the checker fetches the reservation page from.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub page_url: String,
    pub fetch_timeout: Option<Duration>,
}

impl SourceConfig {
    /// Reads only the source settings, so one-off checks can run without secrets.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    fn from_env() -> Result<Self, ConfigError> {
        let page_url = env::var("RESERVATION_PAGE_URL")
            .unwrap_or_else(|_| DEFAULT_RESERVATION_PAGE_URL.to_string());
        let fetch_timeout = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => match parse_value::<u64>("FETCH_TIMEOUT_SECS", &raw)? {
                0 => return Err(ConfigError::InvalidFetchTimeout),
                secs => Some(Duration::from_secs(secs)),
            },
            Err(_) => None,
        };
        Ok(Self {
            page_url,
            fetch_timeout,
        })
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_RESERVATION_PAGE_URL.to_string(),
            fetch_timeout: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
}

impl MonitorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secs = parse_or("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL.as_secs())?;
        if secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(Self {
            poll_interval: Duration::from_secs(secs),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber { name })
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    InvalidNumber { name: &'static str },
    InvalidPort,
    InvalidInterval,
    InvalidFetchTimeout,
    InvalidSessionTtl,
    InvalidHost { source: std::net::AddrParseError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{name} must be set"),
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a non-negative integer")
            }
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidInterval => {
                write!(f, "POLL_INTERVAL_SECS must be greater than zero")
            }
            ConfigError::InvalidFetchTimeout => {
                write!(f, "FETCH_TIMEOUT_SECS must be greater than zero")
            }
            ConfigError::InvalidSessionTtl => write!(
                f,
                "SESSION_TTL_SECS must be between 1 and {}",
                MAX_SESSION_TTL.as_secs()
            ),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
