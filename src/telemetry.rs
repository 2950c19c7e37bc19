use tracing_subscriber::EnvFilter;

use crate::config::DeploymentMode;

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides the default `info` filter. Colors are off in
/// production. Calling this more than once leaves the first subscriber in place.
pub fn init_tracing(mode: DeploymentMode) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(!mode.is_production())
        .try_init();

    if result.is_ok() {
        tracing::debug!(%mode, "Tracing initialized");
    }
}
