use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize a tracing subscriber for registry diagnostics.
///
/// Logs go to stdout. The `RUST_LOG` environment variable sets the level,
/// defaulting to "info". Registrations and provider loads log at `debug`,
/// per-call enforcement at `trace`.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_with_default("info")
}

/// Like [`init`], with a caller-chosen fallback filter such as
/// `"meta_core=debug"`.
pub fn init_with_default(default_filter: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, info};

    #[test]
    fn test_logging_init() {
        // Only the first init in a process succeeds.
        let _ = init();
        assert!(init_with_default("meta_core=debug").is_err());

        info!("registry ready");
        debug!(types = 3, "resolved");
    }
}
