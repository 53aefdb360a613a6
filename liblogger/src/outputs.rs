/*
 * Log sinks. Console writes to stdout; file appends and rotates once the
 * configured size is exceeded.
 */

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{LogConfig, LogType};

pub trait LogOutput: Send {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String>;
}

pub struct ConsoleOutput;

impl LogOutput for ConsoleOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        writeln!(io::stdout(), "{}", formatted_message)
            .map_err(|e| format!("Failed to write to console: {}", e))
    }
}

pub struct FileOutput {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: Option<u64>,
    force_flush: bool,
}

impl FileOutput {
    pub fn new(path: &Path, max_bytes: Option<u64>, force_flush: bool) -> Result<Self, String> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create log directory: {}", e))?;
            }
        }
        let file = Self::open(path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(FileOutput {
            path: path.to_path_buf(),
            file,
            written,
            max_bytes,
            force_flush,
        })
    }

    fn open(path: &Path) -> Result<File, String> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| format!("Failed to open log file: {}", e))
    }

    fn rotated_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".1");
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> Result<(), String> {
        self.file
            .flush()
            .map_err(|e| format!("Failed to flush log file: {}", e))?;
        fs::rename(&self.path, self.rotated_path())
            .map_err(|e| format!("Failed to rotate log file: {}", e))?;
        self.file = Self::open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl LogOutput for FileOutput {
    fn write_log(&mut self, formatted_message: &str) -> Result<(), String> {
        let incoming = formatted_message.len() as u64 + 1;
        if let Some(max) = self.max_bytes {
            if self.written > 0 && self.written + incoming > max {
                self.rotate()?;
            }
        }

        self.file
            .write_all(formatted_message.as_bytes())
            .and_then(|_| self.file.write_all(b"\n"))
            .map_err(|e| format!("Failed to write to log file: {}", e))?;
        self.written += incoming;

        if self.force_flush {
            self.file
                .flush()
                .map_err(|e| format!("Failed to flush log file: {}", e))?;
        }
        Ok(())
    }
}

pub fn create_log_output(config: &LogConfig) -> Result<Box<dyn LogOutput>, String> {
    match config.log_type {
        LogType::Console => Ok(Box::new(ConsoleOutput)),
        LogType::File => {
            let path = config
                .resolved_file_path()
                .ok_or_else(|| "File output requires file_path".to_string())?;
            let max_bytes = config.max_file_size_mb.map(|mb| mb * 1024 * 1024);
            Ok(Box::new(FileOutput::new(Path::new(&path), max_bytes, config.force_flush)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_rotates_past_the_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("easy.log");
        let mut output = FileOutput::new(&path, Some(32), true).unwrap();

        output.write_log("first line that is long").unwrap();
        output.write_log("second line that is long").unwrap();

        let rotated = fs::read_to_string(output.rotated_path()).unwrap();
        let current = fs::read_to_string(&path).unwrap();
        assert_eq!(rotated, "first line that is long\n");
        assert_eq!(current, "second line that is long\n");
    }

    #[test]
    fn file_output_without_path_is_rejected() {
        let config = LogConfig {
            log_type: LogType::File,
            ..LogConfig::default()
        };
        assert!(create_log_output(&config).is_err());
    }
}
