//! Structured tracing setup.

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Installs a global `fmt` subscriber.
///
/// The filter comes from `RUST_LOG` when set and falls back to
/// `default_directive` otherwise.
///
/// # Errors
///
/// Fails when `default_directive` cannot be parsed or a global subscriber is
/// already installed.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive)
            .with_context(|| format!("invalid log directive `{default_directive}`"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("installing tracing subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_fails() {
        let first = init_tracing(DEFAULT_DIRECTIVE);
        let second = init_tracing(DEFAULT_DIRECTIVE);
        assert!(first.is_err() || second.is_err());
    }
}
