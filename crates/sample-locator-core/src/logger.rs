//! Stderr logger for the locator binaries.
//!
//! Lines look like `[  0.012s  INFO sample_locator] good matches 42`. Install
//! once at startup with [`init_with_level`] or [`init_from_name`]; with the
//! `tracing` feature, `init_tracing` installs a `tracing-subscriber` instead.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    #[error("unknown log level {0:?} (expected off, error, warn, info, debug or trace)")]
    InvalidLevel(String),
    #[error(transparent)]
    AlreadySet(#[from] log::SetLoggerError),
}

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    /// Crate name of the record, dropping the module path.
    fn short_target<'a>(record: &'a Record) -> &'a str {
        record.target().split("::").next().unwrap_or_default()
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:7.3}s {:>5} {}] {}",
            self.started.elapsed().as_secs_f64(),
            record.level(),
            Self::short_target(record),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Parse a level name, case-insensitively.
pub fn parse_level(name: &str) -> Result<LevelFilter, LoggerError> {
    name.trim()
        .parse()
        .map_err(|_| LoggerError::InvalidLevel(name.to_string()))
}

/// Install the stderr logger at `level`. Later calls are no-ops.
pub fn init_with_level(level: LevelFilter) -> Result<(), LoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| StderrLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// [`parse_level`] followed by [`init_with_level`].
pub fn init_from_name(name: &str) -> Result<(), LoggerError> {
    init_with_level(parse_level(name)?)
}

/// `EnvFilter` directive used when `RUST_LOG` is unset.
pub fn default_directive(level: LevelFilter) -> String {
    level.as_str().to_ascii_lowercase()
}

/// Install a `tracing` subscriber filtered by `RUST_LOG`, falling back to
/// `default_level`. `log` records are forwarded through the log bridge.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, default_level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init()
    };
}
