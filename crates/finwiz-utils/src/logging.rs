//! Logging and tracing setup
//!
//! Console output is always on. With a log directory, every event is also
//! appended to a dated file and errors to a separate file.

use crate::error::{Result, UtilsError};
use chrono::{Local, NaiveDate};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FORMAT_VAR: &str = "FINWIZ_LOG_FORMAT";
pub const LOG_DIR_VAR: &str = "FINWIZ_LOG_DIR";
pub const ERROR_LOG_FILE: &str = "finwiz-errors.log";

/// Console output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    /// Anything but `json` means text
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is unset
    pub default_directive: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            default_directive: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            format: get(LOG_FORMAT_VAR)
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            dir: get(LOG_DIR_VAR).map(PathBuf::from),
            ..Self::default()
        }
    }
}

/// `finwiz-YYYY-MM-DD.log`
pub fn daily_log_name(date: NaiveDate) -> String {
    format!("finwiz-{}.log", date.format("%Y-%m-%d"))
}

fn open_append(path: PathBuf) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| UtilsError::LogFile { path, source })
}

/// Open (creating as needed) the daily log and the error log in `dir`
pub fn open_log_files(dir: &Path, date: NaiveDate) -> Result<(File, File)> {
    std::fs::create_dir_all(dir).map_err(|source| UtilsError::LogFile {
        path: dir.to_path_buf(),
        source,
    })?;
    let daily = open_append(dir.join(daily_log_name(date)))?;
    let errors = open_append(dir.join(ERROR_LOG_FILE))?;
    Ok((daily, errors))
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the default filter. Returns the daily log path
/// when file logging is on.
pub fn init_tracing(config: &LogConfig) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let json = config.format == LogFormat::Json;
    let console_json = json.then(|| fmt::layer().json());
    let console_text = (!json).then(fmt::layer);

    let today = Local::now().date_naive();
    let (daily, errors, daily_path) = match &config.dir {
        Some(dir) => {
            let (daily, errors) = open_log_files(dir, today)?;
            (
                Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(daily))),
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(errors))
                        .with_filter(LevelFilter::ERROR),
                ),
                Some(dir.join(daily_log_name(today))),
            )
        }
        None => (None, None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_text)
        .with(daily)
        .with(errors)
        .try_init()
        .map_err(|e| UtilsError::Subscriber(e.to_string()))?;

    Ok(daily_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(LOG_FORMAT_VAR, "JSON"), (LOG_DIR_VAR, "logs")]);
        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.dir, Some(PathBuf::from("logs")));

        let blank = LogConfig::from_lookup(|k| (k == LOG_DIR_VAR).then(|| "  ".to_string()));
        assert_eq!(blank, LogConfig::default());
    }

    #[test]
    fn test_daily_log_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(daily_log_name(date), "finwiz-2025-03-04.log");
    }

    #[test]
    fn test_log_files_append() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();

        for line in ["first\n", "second\n"] {
            let (mut daily, mut errors) = open_log_files(&logs, date).unwrap();
            daily.write_all(line.as_bytes()).unwrap();
            errors.write_all(line.as_bytes()).unwrap();
        }

        let daily = std::fs::read_to_string(logs.join("finwiz-2025-03-04.log")).unwrap();
        assert_eq!(daily, "first\nsecond\n");
        assert!(logs.join(ERROR_LOG_FILE).exists());
    }
}
