use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Level forced by `-v` flags, overriding the configured one.
fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

/// Install the global subscriber. Output goes to stderr so command output on
/// stdout stays machine readable.
///
/// Precedence: `-v` flags, then `RUST_LOG`, then `logging.level`.
pub fn init(config: &LoggingConfig, verbose: u8) {
    let filter = match verbosity_level(verbose) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Plain => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(e) = installed {
        eprintln!("logging already initialized: {e}");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(verbosity_level(0), None);
        assert_eq!(verbosity_level(1), Some("info"));
        assert_eq!(verbosity_level(2), Some("debug"));
        assert_eq!(verbosity_level(7), Some("trace"));
    }
}
