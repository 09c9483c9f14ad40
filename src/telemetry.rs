//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Installs a compact fmt subscriber.  `RUST_LOG` wins over
/// `default_level` when set.
pub fn init(default_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)
            .map_err(|err| anyhow::anyhow!("invalid log level `{default_level}`: {err}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}
