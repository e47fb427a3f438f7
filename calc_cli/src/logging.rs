//! Log setup for the `reckon` command.
//!
//! Logs go to stderr with a compact timestamp so stdout stays clean for
//! results and `--json` output. `RUST_LOG` takes precedence over config:
//!
//! ```bash
//! RUST_LOG=calc_core=trace reckon run roofing --set length=40 ...
//! ```

use std::sync::Once;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

static INIT: Once = Once::new();

/// Compact time format: HH:MM:SS.mmm
struct CompactTime;

impl FormatTime for CompactTime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Level after applying `-v` flags to the configured default.
///
/// Flags only ever make output more verbose; a default that is already
/// louder than the flag asks for is kept.
pub fn effective_level(default: &str, verbosity: u8) -> String {
    let (requested, name) = match verbosity {
        0 => return default.to_string(),
        1 => (LevelFilter::INFO, "info"),
        2 => (LevelFilter::DEBUG, "debug"),
        _ => (LevelFilter::TRACE, "trace"),
    };
    match default.trim().parse::<LevelFilter>() {
        Ok(configured) if configured > requested => default.to_string(),
        _ => name.to_string(),
    }
}

/// Filter directive string built from config and verbosity.
pub fn filter_directives(config: &LoggingConfig, verbosity: u8) -> String {
    let mut directives = effective_level(&config.default, verbosity);
    for (module, level) in &config.modules {
        directives.push_str(&format!(",{module}={level}"));
    }
    directives
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init(config: &LoggingConfig, verbosity: u8) {
    INIT.call_once(|| {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(filter_directives(config, verbosity))
        };

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_timer(CompactTime)
            .with_level(true)
            .with_filter(filter);

        tracing_subscriber::registry().with(fmt_layer).init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(effective_level("warn", 0), "warn");
        assert_eq!(effective_level("warn", 1), "info");
        assert_eq!(effective_level("warn", 2), "debug");
        assert_eq!(effective_level("warn", 5), "trace");
    }

    #[test]
    fn test_verbosity_never_lowers_level() {
        assert_eq!(effective_level("debug", 1), "debug");
        assert_eq!(effective_level("trace", 2), "trace");
        assert_eq!(effective_level("debug", 3), "trace");
        assert_eq!(effective_level("off", 1), "info");
    }

    #[test]
    fn test_module_overrides_follow_default() {
        let mut config = LoggingConfig::default();
        config.modules.insert("calc_core".to_string(), "trace".to_string());
        assert_eq!(filter_directives(&config, 0), "warn,calc_core=trace");
    }
}
