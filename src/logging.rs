//! Logging setup for the `bbdup` binary.
//!
//! Library code logs through the `log` macros; the binary installs a
//! `tracing-subscriber` fmt subscriber, which also picks up `log` records.
//! `RUST_LOG` takes precedence over the `-v`/`-q` flags.

use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Level implied by the CLI flags when `RUST_LOG` is unset.
pub fn determine_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// JSON/YAML output. Calling it twice is a no-op.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = determine_level(verbose, quiet);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    tracing::debug!(%level, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(determine_level(0, false), Level::WARN);
        assert_eq!(determine_level(1, false), Level::INFO);
        assert_eq!(determine_level(2, false), Level::DEBUG);
        assert_eq!(determine_level(5, false), Level::TRACE);
        assert_eq!(determine_level(3, true), Level::ERROR);
    }
}
