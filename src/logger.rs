use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::GenConfig;

static STUDIO_LOGGER: Lazy<StudioLogger> = Lazy::new(StudioLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::default())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level;
    STUDIO_LOGGER.update_config(config)?;

    log::set_logger(&*STUDIO_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "💡",
            LogLevel::Warn => "⚠️",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
        }
    }

    pub fn from_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }

    /// Parses `RUST_LOG`-style names; unknown input falls back to `Info`.
    pub fn parse_or_info(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// One line of output; also the JSON shape written to the log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl LogEntry {
    fn from_record(record: &Record) -> Self {
        let location = match (record.file(), record.line()) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            level: LogLevel::from_level(record.level()),
            target: record.target().to_string(),
            message: record.args().to_string(),
            location,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_emojis: bool,
    pub show_target: bool,
    pub show_location: bool,
    pub timestamp_format: String,
    pub output_json: bool,
    pub log_file_path: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_emojis: true,
            show_target: true,
            show_location: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
            log_file_path: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_file_output(mut self, path: &str) -> Self {
        self.log_file_path = Some(path.to_string());
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            show_emojis: false,
            output_json: true,
            log_file_path: Some("rgenmedia.log".to_string()),
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_emojis: true,
            show_location: true,
            ..Default::default()
        }
    }
}

pub struct StudioLogger {
    config: Mutex<LoggerConfig>,
    log_file: Mutex<Option<File>>,
}

impl StudioLogger {
    fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            log_file: Mutex::new(None),
        }
    }

    fn update_config(&self, new_config: LoggerConfig) -> Result<(), String> {
        let file = match &new_config.log_file_path {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path, e))?,
            ),
            None => None,
        };

        if let Ok(mut guard) = self.log_file.lock() {
            *guard = file;
        }
        if let Ok(mut guard) = self.config.lock() {
            *guard = new_config;
        }
        Ok(())
    }

    pub fn format_line(entry: &LogEntry, config: &LoggerConfig) -> String {
        let paint = |text: String, color: Color| -> String {
            if config.show_colors {
                text.color(color).to_string()
            } else {
                text
            }
        };

        let mut line = paint(
            format!("{} ", entry.timestamp.format(&config.timestamp_format)),
            Color::BrightBlack,
        );

        let level = if config.show_emojis {
            format!("{} {}", entry.level.emoji(), entry.level.as_str())
        } else {
            entry.level.as_str().to_string()
        };
        line.push_str(&format!("[{}] ", paint(level, entry.level.color())));

        if config.show_target && !entry.target.is_empty() {
            line.push_str(&paint(format!("{}: ", entry.target), Color::BrightBlue));
        }

        line.push_str(&entry.message);

        if config.show_location {
            if let Some(location) = &entry.location {
                line.push_str(&paint(format!(" ({})", location), Color::BrightBlack));
            }
        }

        line
    }

    fn write_to_file(&self, entry: &LogEntry) {
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let json = serde_json::to_string(entry).unwrap_or_default();
                let _ = writeln!(file, "{}", json);
            }
        }
    }
}

impl log::Log for StudioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.config
            .lock()
            .map(|config| LogLevel::from_level(metadata.level()) >= config.min_level)
            .unwrap_or(true)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let entry = LogEntry::from_record(record);
        if let Ok(config) = self.config.lock() {
            if config.output_json {
                eprintln!("{}", serde_json::to_string(&entry).unwrap_or_default());
            } else {
                eprintln!("{}", Self::format_line(&entry, &config));
            }
        }
        self.write_to_file(&entry);
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut guard) = self.log_file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a job phase took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} finished in {:.2}s",
            self.name,
            self.elapsed().as_secs_f64()
        );
    }
}

pub fn timer(name: &str) -> Timer {
    Timer::new(name)
}

pub fn log_config_info(config: &GenConfig) {
    log::info!("⚙️  Configuration loaded:");
    log::info!("   Endpoint: {}", config.base_url);
    log::info!("   Image model: {}", config.image_model);
    log::info!("   Video model: {}", config.video_model);
    log::info!(
        "   API key: {}",
        if config.api_key.is_some() { "✅" } else { "❌" }
    );
    log::info!("   Poll interval: {:?}", config.poll_interval);
    match (config.max_poll_attempts, config.poll_deadline) {
        (None, None) => log::info!("   Poll bound: none"),
        (attempts, deadline) => log::info!(
            "   Poll bound: attempts={:?} deadline={:?}",
            attempts,
            deadline
        ),
    }
    if let Some(path) = &config.history_path {
        log::info!("   History: {}", path.display());
    }
}
