//! Minimal `log` backend writing styled lines to stderr.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::output::FormatStyle;

struct ConsoleLogger {
    level: LevelFilter,
    style: FormatStyle,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let style = match record.level() {
            log::Level::Error => &self.style.error,
            log::Level::Warn => &self.style.warning,
            log::Level::Info => &self.style.info,
            log::Level::Debug | log::Level::Trace => &self.style.trace,
        };
        let tag = format!("[{}]", record.level().as_str().to_lowercase());
        eprintln!("{} {}", style.apply_to(tag), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Warnings are always shown; each `-v` lowers the threshold by one level.
pub fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbose: u8) -> Result<(), SetLoggerError> {
    let level = verbosity_filter(verbose);
    let logger: &'static ConsoleLogger = Box::leak(Box::new(ConsoleLogger {
        level,
        style: FormatStyle::default(),
    }));
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}
