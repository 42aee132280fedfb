//! Logging setup for the vidrate binary.
//!
//! Bridges the `log` facade to stderr with a timestamped line format.
//! Level selection, most specific wins:
//! - `--log-level` CLI flag
//! - `VIDRATE_LOG` environment variable
//! - default: warn
//!
//! Library code only uses the `log` macros; embedding hosts install their
//! own logger instead of calling this.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{}] [{}] [{}] {}",
            timestamp(),
            level,
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Install the stderr logger. Safe to call once at startup; later calls are
/// ignored (the `log` crate rejects a second logger).
pub fn init(cli_level: Option<&str>) {
    let level = cli_level
        .and_then(parse_level)
        .or_else(|| std::env::var("VIDRATE_LOG").ok().as_deref().and_then(parse_level))
        .unwrap_or(LevelFilter::Warn);

    let logger = Box::new(StderrLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}
