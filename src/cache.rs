use redis::AsyncCommands;
use redis::Client;

use crate::error::{CacheError, CacheResult};
use crate::handle::CacheHandle;

/// JSON values stored through the shared cache handle
#[derive(Clone, Debug)]
pub struct Cache {
    handle: CacheHandle<Client>,
}

impl Cache {
    pub fn new(handle: CacheHandle<Client>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &CacheHandle<Client> {
        &self.handle
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key does not exist.
    pub async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let mut conn = self.handle.multiplexed_connection().await?;
        let cached: Option<String> = conn.get(key).await?;

        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Stores a value in the cache with a TTL in seconds
    ///
    /// A TTL of zero is rejected before contacting the server.
    pub async fn set_json<T: serde::Serialize>(&self, key: &str, value: &T, ttl: u64) -> CacheResult<()> {
        if ttl == 0 {
            return Err(CacheError::InvalidInput(format!(
                "TTL for key {} must be at least one second",
                key
            )));
        }

        let json = serde_json::to_string(value)?;
        let mut conn = self.handle.multiplexed_connection().await?;
        let _: () = conn.set_ex(key, json, ttl).await?;
        Ok(())
    }

    /// Removes a key, returning whether it existed
    pub async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.handle.multiplexed_connection().await?;
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
