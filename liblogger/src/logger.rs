/*
 * Global logger.
 *
 * One process-wide instance behind a mutex, created lazily. Until it is
 * initialized every record goes to stderr at `info` and above. Writing is
 * synchronous; a record is on its sink when the macro returns.
 */

use chrono::Utc;
use once_cell::sync::OnceCell;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::{LogConfig, LogLevel};
use crate::outputs::{create_log_output, LogOutput};

static LOGGER_INSTANCE: OnceCell<Arc<Mutex<LoggerInner>>> = OnceCell::new();

struct LoggerInner {
    config: Option<LogConfig>,
    output: Option<Box<dyn LogOutput>>,
}

impl LoggerInner {
    fn new() -> Self {
        LoggerInner {
            config: None,
            output: None,
        }
    }

    fn threshold(&self) -> LogLevel {
        self.config
            .as_ref()
            .map_or(LogLevel::Info, |config| config.threshold)
    }

    fn init_with_config(&mut self, config: LogConfig) -> Result<(), String> {
        self.output = Some(create_log_output(&config)?);
        self.config = Some(config);
        Ok(())
    }

    fn log(&mut self, level: LogLevel, message: &str, context: Option<&str>, file: &str, line: u32, module: &str) {
        if level < self.threshold() {
            return;
        }
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let formatted = format_log_message(&timestamp, level, message, context, file, line, module);
        match self.output {
            Some(ref mut output) => {
                if let Err(e) = output.write_log(&formatted) {
                    eprintln!("Failed to write log: {}", e);
                }
            }
            None => {
                let _ = writeln!(io::stderr(), "{}", formatted);
            }
        }
    }
}

pub(crate) fn format_log_message(
    timestamp: &str,
    level: LogLevel,
    message: &str,
    context: Option<&str>,
    file: &str,
    line: u32,
    module: &str,
) -> String {
    let level_str = level.as_str();
    match context {
        Some(ctx) => format!(
            "{} [{}] [{}:{}] [{}] {} | {}",
            timestamp, level_str, file, line, module, message, ctx
        ),
        None => format!(
            "{} [{}] [{}:{}] [{}] {}",
            timestamp, level_str, file, line, module, message
        ),
    }
}

fn instance() -> MutexGuard<'static, LoggerInner> {
    let logger = LOGGER_INSTANCE.get_or_init(|| Arc::new(Mutex::new(LoggerInner::new())));
    logger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct Logger;

impl Logger {
    /// Reads `[logging]` from the given TOML file and installs the sink.
    /// Calling it again replaces the previous configuration.
    pub fn init_with_config_file<P: AsRef<Path>>(config_path: P) -> Result<(), String> {
        let config = LogConfig::from_file(config_path)?;
        Self::init_with_config(config)
    }

    pub fn init_with_config(config: LogConfig) -> Result<(), String> {
        instance().init_with_config(config)
    }

    pub fn is_initialized() -> bool {
        instance().config.is_some()
    }

    /// Whether a record at `level` would currently be written.
    pub fn enabled(level: LogLevel) -> bool {
        level >= instance().threshold()
    }

    pub fn debug(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Debug, message, context, file, line, module)
    }

    pub fn info(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Info, message, context, file, line, module)
    }

    pub fn warn(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Warn, message, context, file, line, module)
    }

    pub fn error(message: &str, context: Option<String>, file: &'static str, line: u32, module: &'static str) {
        Self::log_with_metadata(LogLevel::Error, message, context, file, line, module)
    }

    fn log_with_metadata(level: LogLevel, message: &str, context: Option<String>, file: &str, line: u32, module: &str) {
        let file_name = Path::new(file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(file);
        instance().log(level, message, context.as_deref(), file_name, line, module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogType;
    use serial_test::serial;
    use std::fs;

    #[test]
    fn message_format_carries_location_and_context() {
        let line = format_log_message(
            "2024-01-01T00:00:00Z",
            LogLevel::Warn,
            "transfer aborted",
            Some("code=23"),
            "handle.rs",
            42,
            "easy_engine::handle",
        );
        assert_eq!(
            line,
            "2024-01-01T00:00:00Z [WARN] [handle.rs:42] [easy_engine::handle] transfer aborted | code=23"
        );
    }

    #[test]
    #[serial]
    fn file_sink_respects_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("easy.log");
        Logger::init_with_config(LogConfig {
            log_type: LogType::File,
            threshold: LogLevel::Warn,
            file_path: Some(path.to_string_lossy().into_owned()),
            force_flush: true,
            ..LogConfig::default()
        })
        .unwrap();

        crate::log_info!("dropped");
        crate::log_warn!("kept", Some("ctx".to_string()));
        assert!(!Logger::enabled(LogLevel::Info));

        Logger::init_with_config(LogConfig::default()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("dropped"));
        assert!(contents.contains("[WARN] [logger.rs:"));
        assert!(contents.contains("kept | ctx"));
    }
}
