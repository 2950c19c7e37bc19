/// Errors surfaced by the cache handle provider and its helpers
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Raised by the redis client and passed through untouched
    #[error(transparent)]
    Connection(#[from] redis::RedisError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        CacheError::Configuration(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, CacheError::Configuration(_))
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, CacheError::Connection(_))
    }
}

impl From<envy::Error> for CacheError {
    fn from(e: envy::Error) -> Self {
        CacheError::Configuration(format!("Failed to load config: {}", e))
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
