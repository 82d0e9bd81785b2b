// ============================================================================
// src/util/logging.rs – tracing setup with optional append-only debug log
// ============================================================================

use chrono::{DateTime, Local, TimeZone};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, warn, Level};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

use crate::config::Logging;

/// `[YYYY-MM-DD HH:MM:SS]` in local time.
pub fn stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("[%Y-%m-%d %H:%M:%S]").to_string()
}

struct LocalStamp;

impl FormatTime for LocalStamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", stamp(&Local::now()))
    }
}

fn open_debug_log(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. Stderr follows `RUST_LOG`, else the
/// configured filter; `debug` adds a DEBUG-level file layer.
pub fn init(debug: bool, cfg: &Logging) {
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(stderr_filter);

    let (file_layer, open_error) = if debug {
        match open_debug_log(&cfg.debug_log) {
            Ok(file) => (
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false)
                        .with_timer(LocalStamp)
                        .with_filter(LevelFilter::from_level(Level::DEBUG)),
                ),
                None,
            ),
            Err(err) => (None, Some(err)),
        }
    } else {
        (None, None)
    };

    let installed = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(err) = open_error {
        warn!(
            "could not open {}: {}; logging to stderr only",
            cfg.debug_log.display(),
            err
        );
    } else if debug && installed {
        debug!("debug logging to {}", cfg.debug_log.display());
    }
}
