use tokio::sync::OnceCell;
use tracing::instrument;

use crate::{
    client::ClientFactory,
    config::{DeploymentMode, Settings},
    error::CacheResult,
    handle::CacheHandle,
};

/// Hands out the shared cache handle
///
/// The handle is built on the first call to [`get_handle`](Self::get_handle)
/// and every later call returns the same instance. Create one provider at
/// startup and pass it to whatever needs the cache.
pub struct CacheHandleProvider<F: ClientFactory> {
    settings: Settings,
    factory: F,
    handle: OnceCell<CacheHandle<F::Client>>,
}

impl<F: ClientFactory> CacheHandleProvider<F> {
    pub fn new(settings: Settings, factory: F) -> Self {
        Self {
            settings,
            factory,
            handle: OnceCell::new(),
        }
    }

    pub fn mode(&self) -> DeploymentMode {
        self.settings.mode()
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    /// Returns the shared handle, building it on first use
    ///
    /// Concurrent first callers wait on a single construction. A failed
    /// construction is not cached, so the next call tries again.
    pub async fn get_handle(&self) -> CacheResult<CacheHandle<F::Client>> {
        let handle = self.handle.get_or_try_init(|| self.build_handle()).await?;
        Ok(handle.clone())
    }

    #[instrument(skip_all, fields(mode = %self.mode()))]
    async fn build_handle(&self) -> CacheResult<CacheHandle<F::Client>> {
        let mode = self.mode();
        let connection = self.settings.connection_for(mode)?;

        tracing::info!(endpoint = %connection.endpoint(), db = connection.db(), "Creating cache client");

        let client = self.factory.create_client(&connection).await.map_err(|e| {
            tracing::error!(error = %e, endpoint = %connection.endpoint(), "Cache client creation failed");
            e
        })?;

        Ok(CacheHandle::new(client, mode, connection.endpoint()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClientFactory;
    use crate::error::CacheError;
    use tokio_test::{assert_err, assert_ok};

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        Settings::from_vars(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
    }

    #[tokio::test]
    async fn test_handle_built_once() {
        let mut factory = MockClientFactory::new();
        factory
            .expect_create_client()
            .withf(|connection| connection.endpoint() == "cache.internal:6379")
            .times(1)
            .returning(|_| Ok(42));

        let provider = CacheHandleProvider::new(settings(&[("REDIS_HOST", "cache.internal")]), factory);
        assert!(!provider.is_initialized());

        let first = provider.get_handle().await.unwrap();
        for _ in 0..10 {
            let next = provider.get_handle().await.unwrap();
            assert!(first.same_instance(&next));
        }

        assert!(provider.is_initialized());
        assert_eq!(*first.client(), 42);
        assert_eq!(first.endpoint(), "cache.internal:6379");
    }

    #[tokio::test]
    async fn test_missing_config_never_reaches_factory() {
        let mut factory = MockClientFactory::new();
        factory.expect_create_client().never();

        let provider = CacheHandleProvider::new(settings(&[("APP_ENV", "production")]), factory);

        let err = assert_err!(provider.get_handle().await);
        assert!(err.is_configuration());
        assert!(!provider.is_initialized());
    }

    #[tokio::test]
    async fn test_connection_error_propagated_and_retried() {
        let mut calls = 0;
        let mut factory = MockClientFactory::new();
        factory.expect_create_client().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(CacheError::Connection(redis::RedisError::from((
                    redis::ErrorKind::IoError,
                    "connection refused",
                ))))
            } else {
                Ok(7)
            }
        });

        let provider = CacheHandleProvider::new(settings(&[("REDIS_HOST", "localhost")]), factory);

        let err = assert_err!(provider.get_handle().await);
        assert!(err.is_connection());
        assert!(!provider.is_initialized());

        let handle = assert_ok!(provider.get_handle().await);
        assert_eq!(*handle.client(), 7);
    }

    #[tokio::test]
    async fn test_handle_carries_mode() {
        let mut factory = MockClientFactory::new();
        factory.expect_create_client().returning(|_| Ok(1));

        let provider = CacheHandleProvider::new(
            settings(&[("APP_ENV", "production"), ("REDIS_URL", "redis://cache:6379")]),
            factory,
        );

        let handle = provider.get_handle().await.unwrap();

        assert_eq!(provider.mode(), DeploymentMode::Production);
        assert_eq!(handle.mode(), DeploymentMode::Production);
    }

    #[tokio::test]
    async fn test_modes_pass_same_connection_to_factory() {
        for app_env in ["production", "development", "staging"] {
            let mut factory = MockClientFactory::new();
            factory
                .expect_create_client()
                .withf(|connection| connection.endpoint() == "cache:6379" && connection.db() == 1)
                .times(1)
                .returning(|_| Ok(0));

            let provider = CacheHandleProvider::new(
                settings(&[("APP_ENV", app_env), ("REDIS_URL", "redis://cache:6379/1")]),
                factory,
            );

            assert_ok!(provider.get_handle().await);
        }
    }
}
