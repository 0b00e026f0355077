//! Process logging on top of flexi_logger
//!
//! Three line formats: `text` (timestamp, level, message), `ext` (plus the
//! emitting module and line) and `json` (one object per line).

use crate::error::{Error, Result};
use flexi_logger::{DeferredNow, FileSpec, Logger, LoggerHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use strum_macros::{Display, EnumString};

static LOGGER_HANDLE: OnceLock<Mutex<LoggerHandle>> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Ext,
    Json,
}

/// Start the process logger
///
/// Fails if a logger is already installed.
pub fn init_logging(level: &str, format: LogFormat, file: Option<&Path>, color: bool) -> Result<()> {
    let mut logger = Logger::try_with_str(level)
        .map_err(|e| Error::configuration(format!("invalid log level '{level}': {e}")))?;

    logger = match (format, color) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Ext, true) => logger.format(extended_color_format),
        (LogFormat::Ext, false) => logger.format(extended_format),
        (LogFormat::Text, true) => logger.format(simple_color_format),
        (LogFormat::Text, false) => logger.format(simple_format),
    };

    if let Some(path) = file {
        let file_spec = FileSpec::try_from(path)
            .map_err(|e| Error::configuration(format!("invalid log file '{}': {e}", path.display())))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger
        .start()
        .map_err(|e| Error::configuration(format!("cannot start logger: {e}")))?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));
    Ok(())
}

/// Change the active level filter of a started logger
pub fn set_log_level(level: &str) -> Result<()> {
    let handle = LOGGER_HANDLE
        .get()
        .ok_or_else(|| Error::configuration("logger not initialised"))?;
    let mut handle = crate::core::sync::lock(handle)?;
    handle
        .parse_and_push_temp_spec(level)
        .map_err(|e| Error::configuration(format!("invalid log level '{level}': {e}")))
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn level_colored(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    match level {
        log::Level::Error => "ERR".red().bold(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Info => "INF".green(),
        log::Level::Debug => "DBG".blue(),
        log::Level::Trace => "TRC".magenta(),
    }
}

// "YYYY-MM-DD HH:mm:ss.fff INF message"
fn simple_format(w: &mut dyn std::io::Write, now: &mut DeferredNow, record: &log::Record) -> std::io::Result<()> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> std::io::Result<()> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args()
    )
}

// "YYYY-MM-DD HH:mm:ss.fff INF message (consumer/spool.rs:42)"
fn extended_format(w: &mut dyn std::io::Write, now: &mut DeferredNow, record: &log::Record) -> std::io::Result<()> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> std::io::Result<()> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(w: &mut dyn std::io::Write, now: &mut DeferredNow, record: &log::Record) -> std::io::Result<()> {
    let line = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&line) {
        Ok(json) => w.write_all(json.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

/// `amqp_runner::consumer::spool` -> `consumer/spool.rs:<line>`
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("amqp_runner::") {
        Some(module) => module.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line) => format!("{path_like}:{line}"),
        None => path_like,
    }
}
