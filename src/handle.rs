use std::fmt;
use std::sync::Arc;

use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::Client;

use crate::config::DeploymentMode;
use crate::error::CacheResult;

/// Shared handle to the cache client
///
/// Clones share one underlying client. Use [`CacheHandle::same_instance`] to
/// check whether two handles came from the same construction.
pub struct CacheHandle<C> {
    inner: Arc<HandleInner<C>>,
}

struct HandleInner<C> {
    client: C,
    mode: DeploymentMode,
    endpoint: String,
}

impl<C> CacheHandle<C> {
    pub(crate) fn new(client: C, mode: DeploymentMode, endpoint: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                client,
                mode,
                endpoint: endpoint.into(),
            }),
        }
    }

    pub fn client(&self) -> &C {
        &self.inner.client
    }

    pub fn mode(&self) -> DeploymentMode {
        self.inner.mode
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C> Clone for CacheHandle<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> fmt::Debug for CacheHandle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("mode", &self.inner.mode)
            .field("endpoint", &self.inner.endpoint)
            .finish_non_exhaustive()
    }
}

impl CacheHandle<Client> {
    /// Opens a multiplexed connection through the lazy client
    pub async fn multiplexed_connection(&self) -> CacheResult<MultiplexedConnection> {
        let conn = self.inner.client.get_multiplexed_async_connection().await?;
        Ok(conn)
    }
}

impl CacheHandle<ConnectionManager> {
    /// Returns the managed connection; reconnects are handled by the manager
    pub fn manager(&self) -> ConnectionManager {
        self.inner.client.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_instance() {
        let handle = CacheHandle::new(7_u32, DeploymentMode::Development, "localhost:6379");
        let clone = handle.clone();

        assert!(handle.same_instance(&clone));
        assert_eq!(*clone.client(), 7);
        assert_eq!(clone.endpoint(), "localhost:6379");
    }

    #[test]
    fn test_separate_constructions_differ() {
        let a = CacheHandle::new(1_u32, DeploymentMode::Production, "a:6379");
        let b = CacheHandle::new(1_u32, DeploymentMode::Production, "a:6379");

        assert!(!a.same_instance(&b));
    }

    #[test]
    fn test_debug_shows_mode_and_endpoint() {
        let handle = CacheHandle::new((), DeploymentMode::Production, "cache:6379");
        let debug = format!("{:?}", handle);

        assert!(debug.contains("Production"));
        assert!(debug.contains("cache:6379"));
    }
}
