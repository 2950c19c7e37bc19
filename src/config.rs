use std::fmt;

use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo};
use serde::Deserialize;

use crate::error::{CacheError, CacheResult};

/// Deployment mode read from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeploymentMode {
    Production,
    Development,
}

impl DeploymentMode {
    /// Only the exact value `production` selects production mode
    pub fn from_flag(flag: &str) -> Self {
        if flag == "production" {
            DeploymentMode::Production
        } else {
            DeploymentMode::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentMode::Production)
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::Production => write!(f, "production"),
            DeploymentMode::Development => write!(f, "development"),
        }
    }
}

/// Cache configuration loaded from environment variables
#[derive(Deserialize, Clone)]
pub struct Settings {
    /// Deployment mode flag
    #[serde(default = "default_app_env")]
    pub app_env: String,

    /// Full Redis connection URL, preferred over the host fields
    pub redis_url: Option<String>,

    /// Redis host, used when no URL is given
    pub redis_host: Option<String>,

    #[serde(default = "default_redis_port")]
    pub redis_port: u16,

    pub redis_username: Option<String>,

    pub redis_password: Option<String>,

    #[serde(default)]
    pub redis_db: i64,
}

fn default_app_env() -> String {
    "development".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

impl Settings {
    /// Load configuration from environment variables
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> CacheResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of `(NAME, value)` pairs
    pub fn from_vars<I>(vars: I) -> CacheResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars = vars.into_iter().filter(|(_, value)| !value.trim().is_empty());
        Ok(envy::from_iter::<_, Settings>(vars)?)
    }

    pub fn mode(&self) -> DeploymentMode {
        DeploymentMode::from_flag(&self.app_env)
    }

    /// Resolve the connection settings used in `mode`
    ///
    /// Production and development currently resolve to the same settings;
    /// any split between them belongs here.
    pub fn connection_for(&self, mode: DeploymentMode) -> CacheResult<ConnectionSettings> {
        tracing::debug!(%mode, "Resolving cache connection settings");

        let mut info = match (self.redis_url.as_deref(), self.redis_host.as_deref()) {
            (Some(url), _) => url
                .into_connection_info()
                .map_err(|e| CacheError::configuration(format!("Invalid REDIS_URL: {}", e)))?,
            (None, Some(host)) => {
                validate_host(host)?;
                let mut info = (host, self.redis_port)
                    .into_connection_info()
                    .map_err(|e| CacheError::configuration(format!("Invalid REDIS_HOST: {}", e)))?;
                info.redis.db = self.redis_db;
                info
            }
            (None, None) => {
                return Err(CacheError::configuration(
                    "either REDIS_URL or REDIS_HOST must be set",
                ))
            }
        };

        if info.redis.db < 0 {
            return Err(CacheError::configuration(format!(
                "database index must not be negative, got {}",
                info.redis.db
            )));
        }

        if let Some(username) = &self.redis_username {
            info.redis.username = Some(username.clone());
        }
        if let Some(password) = &self.redis_password {
            info.redis.password = Some(password.clone());
        }

        Ok(ConnectionSettings::new(info))
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_env", &self.app_env)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<set>"))
            .field("redis_host", &self.redis_host)
            .field("redis_port", &self.redis_port)
            .field("redis_username", &self.redis_username)
            .field("redis_password", &self.redis_password.as_ref().map(|_| "<redacted>"))
            .field("redis_db", &self.redis_db)
            .finish()
    }
}

/// Connection configuration handed to a [`ClientFactory`](crate::client::ClientFactory)
#[derive(Clone)]
pub struct ConnectionSettings {
    info: ConnectionInfo,
    endpoint: String,
}

impl ConnectionSettings {
    pub fn new(info: ConnectionInfo) -> Self {
        let endpoint = describe_addr(&info.addr);
        Self { info, endpoint }
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Address of the cache server without credentials
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn db(&self) -> i64 {
        self.info.redis.db
    }

    pub fn has_password(&self) -> bool {
        self.info.redis.password.is_some()
    }
}

impl PartialEq for ConnectionSettings {
    fn eq(&self, other: &Self) -> bool {
        self.endpoint == other.endpoint
            && self.info.redis.db == other.info.redis.db
            && self.info.redis.username == other.info.redis.username
            && self.info.redis.password == other.info.redis.password
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("endpoint", &self.endpoint)
            .field("db", &self.info.redis.db)
            .field("username", &self.info.redis.username)
            .field("password", &self.info.redis.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A bare host name or address; ports and schemes go in their own variables
fn validate_host(host: &str) -> CacheResult<()> {
    if host.is_empty() || host.chars().any(|c| c.is_whitespace() || c == ':' || c == '/') {
        return Err(CacheError::configuration(format!(
            "Invalid REDIS_HOST {:?}: expected a bare host name, use REDIS_URL for full addresses",
            host
        )));
    }
    Ok(())
}

fn describe_addr(addr: &ConnectionAddr) -> String {
    match addr {
        ConnectionAddr::Tcp(host, port) => format!("{}:{}", host, port),
        ConnectionAddr::TcpTls { host, port, .. } => format!("{}:{} (tls)", host, port),
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}
