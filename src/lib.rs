pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod handle;
pub mod provider;
pub mod telemetry;

pub use cache::Cache;
pub use client::{ClientFactory, ManagedClientFactory, RedisClientFactory};
pub use config::{ConnectionSettings, DeploymentMode, Settings};
pub use error::{CacheError, CacheResult};
pub use handle::CacheHandle;
pub use provider::CacheHandleProvider;
