// src/utils/log.rs

//! Centralized logging module with server-style formatting.
//!
//! Provides consistent log output with timestamps and log levels, and keeps
//! an in-memory copy of every emitted entry so the run can persist its log
//! file at the end.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use chrono::Local;
use serde::Serialize;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// A single buffered log entry, persisted at end of run.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

/// Current log level
static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// Buffered entries for end-of-run persistence
static BUFFER: Mutex<Vec<LogEntry>> = Mutex::new(Vec::new());

/// Initialize the logging system with a level name.
pub fn init(level: &str) {
    let _ = LOG_LEVEL.set(LogLevel::from_str(level));
}

/// Check if a log level should be displayed
fn should_log(level: LogLevel) -> bool {
    let current = LOG_LEVEL.get().copied().unwrap_or(LogLevel::Info);
    level >= current
}

/// Format a log message with timestamp and level
fn format_log(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

fn buffer(level: LogLevel, message: &str) {
    let entry = LogEntry {
        timestamp: Local::now().to_rfc3339(),
        level: level.as_str().to_string(),
        message: message.to_string(),
    };
    if let Ok(mut entries) = BUFFER.lock() {
        entries.push(entry);
    }
}

fn emit(level: LogLevel, message: &str) {
    if !should_log(level) {
        return;
    }
    buffer(level, message);
    let line = format_log(level, message);
    match level {
        LogLevel::Info => println!("{line}"),
        _ => eprintln!("{line}"),
    }
}

/// Log a debug message
pub fn debug(message: &str) {
    emit(LogLevel::Debug, message);
}

/// Log an info message
pub fn info(message: &str) {
    emit(LogLevel::Info, message);
}

/// Log a warning message
pub fn warn(message: &str) {
    emit(LogLevel::Warn, message);
}

/// Log an error message
pub fn error(message: &str) {
    emit(LogLevel::Error, message);
}

/// Log a success message (always shown as INFO)
pub fn success(message: &str) {
    emit(LogLevel::Info, message);
}

/// Log a header
pub fn header(title: &str) {
    if should_log(LogLevel::Info) {
        let border = "═".repeat(60);
        println!("{}", format_log(LogLevel::Info, &border));
        println!("{}", format_log(LogLevel::Info, &format!("  {}", title)));
        println!("{}", format_log(LogLevel::Info, &border));
    }
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if should_log(LogLevel::Info) {
        println!();

        let title_msg = format!("[SUMMARY] {}", title);
        println!("{}", format_log(LogLevel::Info, &title_msg));

        for (key, value) in items {
            let item_msg = format!("    {}: {}", key, value);
            println!("{}", format_log(LogLevel::Info, &item_msg));
        }
    }
}

/// Persist all buffered entries as a JSON array.
pub fn save_to(path: &Path) -> std::io::Result<()> {
    let entries = BUFFER
        .lock()
        .map(|b| b.clone())
        .unwrap_or_default();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string());
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_str("unknown"), LogLevel::Info);
    }

    #[test]
    fn test_buffered_entries_persist() {
        warn("buffered entry for persistence test");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.log");
        save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("buffered entry for persistence test"));
        assert!(content.contains("WARN"));
    }
}
