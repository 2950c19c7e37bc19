//! Cache client factories
//!
//! The provider only knows [`ClientFactory`]. Protocol handling, pooling and
//! reconnection stay inside the client the factory returns.

use redis::aio::ConnectionManager;
use redis::{Client, ErrorKind};

use crate::{
    config::ConnectionSettings,
    error::{CacheError, CacheResult},
};

/// Builds the client wrapped by a [`CacheHandle`](crate::handle::CacheHandle)
#[cfg_attr(test, mockall::automock(type Client = u32;))]
#[async_trait::async_trait]
pub trait ClientFactory: Send + Sync {
    type Client: Send + Sync + 'static;

    /// Create a client for `connection`
    ///
    /// Whether this opens a socket is up to the implementation.
    async fn create_client(&self, connection: &ConnectionSettings) -> CacheResult<Self::Client>;
}

/// Lazy factory: validates the configuration and opens no connection
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisClientFactory;

#[async_trait::async_trait]
impl ClientFactory for RedisClientFactory {
    type Client = Client;

    async fn create_client(&self, connection: &ConnectionSettings) -> CacheResult<Client> {
        open_client(connection)
    }
}

/// Eager factory: connects through a [`ConnectionManager`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedClientFactory;

#[async_trait::async_trait]
impl ClientFactory for ManagedClientFactory {
    type Client = ConnectionManager;

    async fn create_client(&self, connection: &ConnectionSettings) -> CacheResult<ConnectionManager> {
        let client = open_client(connection)?;
        let manager = ConnectionManager::new(client).await?;
        tracing::info!(endpoint = %connection.endpoint(), "Redis connection manager established");
        Ok(manager)
    }
}

fn open_client(connection: &ConnectionSettings) -> CacheResult<Client> {
    Client::open(connection.info().clone()).map_err(|e| match e.kind() {
        ErrorKind::InvalidClientConfig => {
            CacheError::configuration(format!("Invalid Redis client config: {}", e))
        }
        _ => CacheError::Connection(e),
    })
}
