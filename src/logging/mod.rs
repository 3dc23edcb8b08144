//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level ("trace", "debug", "info", "warn", "error"); default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file
//!   (default "logs/persona-mint.log"), rolled by UTC date

use chrono::{NaiveDate, Utc};
use log::info;
use simplelog::{Config, LevelFilter, SimpleLogger, WriteLogger};
use std::{
    env,
    fs::{create_dir_all, File},
    path::Path,
};
use thiserror::Error;

use crate::constants::{DEFAULT_LOG_FILE_PATH, DEFAULT_LOG_LEVEL, DEFAULT_LOG_MODE};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Logger already initialized: {0}")]
    Init(#[from] log::SetLoggerError),
}

pub fn parse_level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Appends the date to the file stem: `logs/app.log` → `logs/app-2025-01-31.log`.
pub fn rolled_file_path(base_file_path: &str, date: NaiveDate) -> String {
    let date_str = date.format("%Y-%m-%d");
    match base_file_path.strip_suffix(".log") {
        Some(trimmed) => format!("{trimmed}-{date_str}.log"),
        None => format!("{base_file_path}-{date_str}.log"),
    }
}

pub fn setup_logging() -> Result<(), LoggingError> {
    let log_mode = env::var("LOG_MODE").unwrap_or_else(|_| DEFAULT_LOG_MODE.to_string());
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let level_filter = parse_level_filter(&log_level);

    if log_mode.eq_ignore_ascii_case("file") {
        let base_file_path =
            env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE_PATH.to_string());
        let path = rolled_file_path(&base_file_path, Utc::now().date_naive());

        if let Some(parent) = Path::new(&path).parent() {
            create_dir_all(parent).map_err(|source| LoggingError::File {
                path: path.clone(),
                source,
            })?;
        }
        let log_file = File::create(&path).map_err(|source| LoggingError::File {
            path: path.clone(),
            source,
        })?;

        WriteLogger::init(level_filter, Config::default(), log_file)?;
    } else {
        SimpleLogger::init(level_filter, Config::default())?;
    }

    info!("Logging is successfully configured (mode: {})", log_mode);
    Ok(())
}
