//! Logging initialization.
//!
//! All logs go to stderr through the `tracing` ecosystem so stdout stays
//! reserved for pipeline output (JSON records, data URLs, saved-file paths).

use relume_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resolve effective verbosity and format from the `[logging]` section plus
/// CLI overrides. A flag always wins over the config file.
fn resolve(config: &LoggingConfig, verbose_override: bool, json_override: bool) -> (bool, bool) {
    let verbose = verbose_override || matches!(config.level.as_str(), "debug" | "trace");
    let json = json_override || config.format == "json";
    (verbose, json)
}

/// Initialize the logging subsystem.
///
/// `verbose` raises the default level to DEBUG; `RUST_LOG` overrides both.
pub fn init(verbose: bool, json_format: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI flags
/// taking precedence.
pub fn init_from_config(config: &LoggingConfig, verbose_override: bool, json_logs_override: bool) {
    let (verbose, json_format) = resolve(config, verbose_override, json_logs_override);
    init(verbose, json_format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_cli_overrides() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        };
        assert_eq!(resolve(&config, true, false), (true, false));
        assert_eq!(resolve(&config, false, true), (false, true));
    }

    #[test]
    fn test_resolve_reads_config_levels() {
        let config = LoggingConfig {
            level: "trace".to_string(),
            format: "json".to_string(),
        };
        assert_eq!(resolve(&config, false, false), (true, true));
    }
}
