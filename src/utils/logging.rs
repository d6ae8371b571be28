//! Diagnostic logging setup

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level is `warn`, or `debug` for
/// markscope's own targets when `verbose` is on. Stdout stays reserved for
/// the styled report. Fails if a global subscriber is already installed.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose { "warn,markscope=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init()
        .context("Failed to install the logging subscriber")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        // The first call may race other tests for the global slot
        let _ = init_logging(false);
        let err = init_logging(true).unwrap_err();
        assert!(err.to_string().contains("logging subscriber"));
    }
}
