use anyhow::Context;

use cache_handle::{telemetry, CacheHandleProvider, RedisClientFactory, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    telemetry::init_tracing(settings.mode());

    let provider = CacheHandleProvider::new(settings, RedisClientFactory);

    let handle = provider.get_handle().await?;
    let again = provider.get_handle().await?;
    tracing::info!(
        mode = %handle.mode(),
        endpoint = %handle.endpoint(),
        shared = handle.same_instance(&again),
        "Cache handle ready"
    );

    let mut conn = handle
        .multiplexed_connection()
        .await
        .with_context(|| format!("Failed to connect to {}", handle.endpoint()))?;
    let reply: String = redis::cmd("PING").query_async(&mut conn).await?;

    println!("{}", reply);
    Ok(())
}
