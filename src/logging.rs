use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger structure
#[derive(Debug)]
struct ArenaLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

impl ArenaLogger {
    // Pulls "[K03][T000123]" style context out of a tank/tick tagged message
    fn context_prefix(message: &str) -> String {
        let mut context = String::new();
        if let Some(id) = Self::number_after(message, "Tank ") {
            context.push_str(&format!("[K{:02}]", id));
        }
        if let Some(tick) = Self::number_after(message, "Tick ") {
            context.push_str(&format!("[T{:06}]", tick));
        }
        if !context.is_empty() {
            context.push(' ');
        }
        context
    }

    fn number_after(message: &str, marker: &str) -> Option<u64> {
        let start = message.find(marker)? + marker.len();
        let digits: String = message[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

impl log::Log for ArenaLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Topic filters only narrow debug and trace output
        if let Some(filters) = &self.debug_filters {
            if metadata.level() >= log::Level::Debug {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        let message = record.args().to_string();
        let context = Self::context_prefix(&message);

        let output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {message}",
            level = record.level(),
            target = record.target(),
        );

        // Logging must never take the simulation down
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
        let _ = stdout.flush();
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<ArenaLogger> = OnceLock::new();

/// Installs the arena logger with optional comma-separated debug topics
/// (drive, weapon, shell, ai, collision, world).
///
/// When `RUST_LOG` is set the standard `env_logger` is installed instead so the usual
/// module filters work.
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    if std::env::var_os("RUST_LOG").is_some() {
        return env_logger::Builder::from_default_env().try_init();
    }

    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| ArenaLogger {
        level,
        debug_filters,
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

/// Parses a level name, falling back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

// Helper macros for specific debug topics
#[macro_export]
macro_rules! debug_drive {
    ($fmt:literal $($arg:tt)*) => {
        log::debug!(target: "drive", $fmt $($arg)*)
    };
    ($tank_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "drive", "Tank {} Tick {} {}", $tank_id, $tick, format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_weapon {
    ($fmt:literal $($arg:tt)*) => {
        log::debug!(target: "weapon", $fmt $($arg)*)
    };
    ($tank_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "weapon", "Tank {} Tick {} {}", $tank_id, $tick, format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_shell {
    ($($arg:tt)*) => {
        log::debug!(target: "shell", "{}", format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_ai {
    ($fmt:literal $($arg:tt)*) => {
        log::debug!(target: "ai", $fmt $($arg)*)
    };
    ($tank_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "ai", "Tank {} Tick {} {}", $tank_id, $tick, format_args!($($arg)*))
    }
}
