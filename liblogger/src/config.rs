/*
 * Logger configuration, read from the `[logging]` table of a TOML file.
 *
 * Level and output names are accepted case-insensitively. A missing file is
 * not an error: the logger falls back to console output at `info`.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Log severity levels, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(serde::de::Error::unknown_variant(
                &s,
                &["debug", "info", "warn", "warning", "error"],
            )),
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Where formatted lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogType {
    Console,
    File,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "console" => Ok(LogType::Console),
            "file" => Ok(LogType::File),
            _ => Err(serde::de::Error::unknown_variant(&s, &["console", "file"])),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(rename = "type")]
    pub log_type: LogType,

    /// Minimum level written.
    pub threshold: LogLevel,

    /// Target file when `type = "file"`.
    #[serde(default)]
    pub file_path: Option<String>,

    /// Directory prepended to a relative `file_path`.
    #[serde(default)]
    pub log_folder: Option<String>,

    /// Size at which the file is rotated to `<name>.1`.
    #[serde(default)]
    pub max_file_size_mb: Option<u64>,

    #[serde(default)]
    pub force_flush: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_type: LogType::Console,
            threshold: LogLevel::Info,
            file_path: None,
            log_folder: None,
            max_file_size_mb: None,
            force_flush: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigWrapper {
    logging: LogConfig,
}

impl LogConfig {
    /// Reads the `[logging]` table from a TOML file; other tables are ignored.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self, String> {
        let file_path = file_path.as_ref();
        let config_str = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!(
                    "Warning: Could not read config file '{}': {}. Using defaults.",
                    file_path.display(),
                    e
                );
                return Ok(LogConfig::default());
            }
        };
        Self::from_toml_str(&config_str)
    }

    /// Accepts either a document with a `[logging]` table or a bare logging table.
    pub fn from_toml_str(config_str: &str) -> Result<Self, String> {
        match toml::from_str::<ConfigWrapper>(config_str) {
            Ok(wrapper) => Ok(wrapper.logging),
            Err(e) => toml::from_str::<LogConfig>(config_str)
                .map_err(|_| format!("Failed to parse config file: {}", e)),
        }
    }

    /// Full path of the log file, if file output is configured.
    pub fn resolved_file_path(&self) -> Option<String> {
        let file = self.file_path.as_ref()?;
        match &self.log_folder {
            Some(folder) if Path::new(file).is_relative() => {
                Some(Path::new(folder).join(file).to_string_lossy().into_owned())
            }
            _ => Some(file.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_table_is_read_from_a_larger_document() {
        let config = LogConfig::from_toml_str(
            r#"
            [library]
            path = "libcurl.so.4"

            [logging]
            type = "File"
            threshold = "WARNING"
            file_path = "easy.log"
            log_folder = "logs"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_type, LogType::File);
        assert_eq!(config.threshold, LogLevel::Warn);
        assert_eq!(
            config.resolved_file_path().unwrap(),
            Path::new("logs").join("easy.log").to_string_lossy()
        );
    }

    #[test]
    fn unknown_output_type_is_rejected() {
        let err = LogConfig::from_toml_str("[logging]\ntype = \"http\"\nthreshold = \"info\"\n")
            .unwrap_err();
        assert!(err.contains("http"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = LogConfig::from_file("/nonexistent/easy-logging.toml").unwrap();
        assert_eq!(config.log_type, LogType::Console);
        assert_eq!(config.threshold, LogLevel::Info);
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
