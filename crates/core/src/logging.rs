//! Category-based logging shared by every emulated device.
//!
//! Each [`LogCategory`] carries its own [`LogLevel`]; a category left at `Off`
//! falls back to the global level. Messages are built lazily, so a disabled
//! category costs one atomic load.
//!
//! Output goes to stderr unless a log file has been configured with
//! [`LogConfig::set_log_file`], in which case messages are handed to a
//! background writer thread over a channel.
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Registers, LogLevel::Debug, || {
//!     format!("TIA: write to unknown register ${:02X}", 0x3D)
//! });
//! ```

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "none" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Areas of the video chip that can be traced independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Register reads and writes, including unknown addresses
    Registers,
    /// Scanline rendering and framebuffer bookkeeping
    Render,
    /// Frame boundaries, VSYNC and framerate detection
    Frame,
    /// HMOVE, RESxx and motion-clock corrections
    Motion,
    /// Input latches and paddle dump timing
    Input,
    /// Save and load of device state
    State,
}

const CATEGORY_COUNT: usize = 6;

impl LogCategory {
    /// Every category, in index order
    pub const ALL: [LogCategory; CATEGORY_COUNT] = [
        LogCategory::Registers,
        LogCategory::Render,
        LogCategory::Frame,
        LogCategory::Motion,
        LogCategory::Input,
        LogCategory::State,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Parse a category name as used on the command line (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "registers" | "regs" => Some(LogCategory::Registers),
            "render" => Some(LogCategory::Render),
            "frame" => Some(LogCategory::Frame),
            "motion" | "hmove" => Some(LogCategory::Motion),
            "input" => Some(LogCategory::Input),
            "state" => Some(LogCategory::State),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Window {
    started: Option<Instant>,
    emitted: usize,
    dropped: usize,
}

/// Fixed one-second window limiter, one window per category.
struct RateLimiter {
    max_per_window: AtomicUsize,
    window: Duration,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_per_window: usize) -> Self {
        Self {
            max_per_window: AtomicUsize::new(max_per_window),
            window: Duration::from_secs(1),
            windows: Mutex::new(Default::default()),
        }
    }

    /// Returns whether the message may be written, plus the number of messages
    /// suppressed in the previous window when a new window has just opened.
    fn admit(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let max = self.max_per_window.load(Ordering::Relaxed);
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let w = &mut windows[category.index()];

        let mut report = None;
        let expired = w
            .started
            .map_or(true, |start| now.duration_since(start) >= self.window);
        if expired {
            if w.dropped > 0 {
                report = Some(w.dropped);
            }
            *w = Window {
                started: Some(now),
                ..Window::default()
            };
        }

        if w.emitted < max {
            w.emitted += 1;
            (true, report)
        } else {
            w.dropped += 1;
            (false, report)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    log_sender: Mutex<Option<Sender<String>>>,
    file_logging_enabled: AtomicBool,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// All categories off, 60 messages per second per category.
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: Default::default(),
            log_sender: Mutex::new(None),
            file_logging_enabled: AtomicBool::new(false),
            rate_limiter: RateLimiter::new(60),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category with its own level uses it; otherwise the global level applies.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        let category_level = self.get_level(category);
        let limit = if category_level != LogLevel::Off {
            category_level
        } else {
            self.get_global_level()
        };
        level != LogLevel::Off && level <= limit
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::ALL {
            self.set_level(category, LogLevel::Off);
        }
    }

    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter
            .max_per_window
            .store(max_logs_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_per_window.load(Ordering::Relaxed)
    }

    /// Route output to `path`, written by a background thread.
    ///
    /// Replaces any previously configured file. The file is opened here so
    /// that errors surface to the caller instead of being lost on the thread.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();

        thread::Builder::new()
            .name("tia-log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        if let Ok(mut slot) = self.log_sender.lock() {
            *slot = Some(sender);
        }
        self.file_logging_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop writing to the log file; the writer thread exits once its channel closes.
    pub fn clear_log_file(&self) {
        if let Ok(mut slot) = self.log_sender.lock() {
            *slot = None;
        }
        self.file_logging_enabled.store(false, Ordering::Relaxed);
    }

    fn write_message(&self, message: String) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            if let Ok(slot) = self.log_sender.lock() {
                if let Some(sender) = slot.as_ref() {
                    if let Err(failed) = sender.send(message) {
                        eprintln!("{}", failed.0);
                    }
                    return;
                }
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a message with the specified category and level.
///
/// `message_fn` only runs when the category is enabled at `level` and the
/// category has not exceeded its rate limit for the current second. When a
/// window closes with suppressed messages, a summary line is written first.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped) = config.rate_limiter.admit(category);
    if let Some(count) = dropped {
        config.write_message(format!(
            "[{:?}] WARNING: rate limit exceeded, {} message(s) dropped",
            category, count
        ));
    }
    if allowed {
        config.write_message(message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("None"), Some(LogLevel::Off));
        assert_eq!(LogLevel::from_str("ERR"), Some(LogLevel::Error));
        assert_eq!(LogLevel::from_str("WARNING"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str(" info "), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("4"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::from_str("loud"), None);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(LogCategory::from_str("hmove"), Some(LogCategory::Motion));
        assert_eq!(LogCategory::from_str("Regs"), Some(LogCategory::Registers));
        assert_eq!(LogCategory::from_str("state"), Some(LogCategory::State));
        assert_eq!(LogCategory::from_str("cpu"), None);
    }

    #[test]
    fn test_category_indices_are_distinct() {
        for (i, category) in LogCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_should_log_with_category_level() {
        let config = LogConfig::new();
        config.set_level(LogCategory::Motion, LogLevel::Info);

        assert!(config.should_log(LogCategory::Motion, LogLevel::Error));
        assert!(config.should_log(LogCategory::Motion, LogLevel::Info));
        assert!(!config.should_log(LogCategory::Motion, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Motion, LogLevel::Off));
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Frame, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Frame, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Render, LogLevel::Warn));
        assert!(config.should_log(LogCategory::Render, LogLevel::Error));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Input, LogLevel::Debug);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Input), LogLevel::Off);
    }

    #[test]
    fn test_rate_limiter_blocks_over_limit() {
        let limiter = RateLimiter::new(60);
        for _ in 0..60 {
            assert!(limiter.admit(LogCategory::Render).0);
        }
        assert!(!limiter.admit(LogCategory::Render).0);
        // Other categories have their own window
        assert!(limiter.admit(LogCategory::Registers).0);
    }

    #[test]
    fn test_rate_limiter_reports_dropped_count() {
        let limiter = RateLimiter::new(3);
        for _ in 0..10 {
            limiter.admit(LogCategory::Motion);
        }

        std::thread::sleep(Duration::from_millis(1100));

        let (allowed, dropped) = limiter.admit(LogCategory::Motion);
        assert!(allowed);
        assert_eq!(dropped, Some(7));
    }
}
