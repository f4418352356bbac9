use crate::error::CliError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with environment-based log level filtering.
/// Log lines go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(verbose: bool) -> Result<(), CliError> {
    let env_filter = log_filter(verbose)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` when verbose.
fn log_filter(verbose: bool) -> Result<EnvFilter, CliError> {
    let default_level = if verbose { "debug" } else { "info" };

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| CliError::Config(format!("Failed to create log filter: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_builds() {
        assert!(log_filter(false).is_ok());
        assert!(log_filter(true).is_ok());
    }
}
