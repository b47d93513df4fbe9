//! Tracing-based [`Notifier`].
//!
//! # Example
//!
//! ```rust
//! use sendpad::notify::{LogLevel, LoggingNotifier};
//!
//! // Successes at INFO, failures at WARN
//! let notifier = LoggingNotifier::new();
//!
//! // Everything at DEBUG
//! let quiet = LoggingNotifier::with_level(LogLevel::Debug);
//! ```

use super::{Notification, NotificationLevel, Notifier};

/// Log verbosity level for successful and informational notifications.
///
/// Failures are always logged at WARN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Trace-level logging (most verbose).
    Trace,
    /// Debug-level logging.
    Debug,
    /// Info-level logging (default).
    #[default]
    Info,
}

/// Emit a log event at the specified level using `tracing` macros.
macro_rules! log_at_level {
    ($level:expr, $($arg:tt)*) => {
        match $level {
            LogLevel::Trace => tracing::trace!($($arg)*),
            LogLevel::Debug => tracing::debug!($($arg)*),
            LogLevel::Info  => tracing::info!($($arg)*),
        }
    };
}

/// A [`Notifier`] that emits structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier {
    level: LogLevel,
}

impl LoggingNotifier {
    /// Create a logging notifier with the default level (INFO).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging notifier with a custom level.
    #[must_use]
    pub const fn with_level(level: LogLevel) -> Self {
        Self { level }
    }

    /// The configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl Notifier for LoggingNotifier {
    fn notify(&self, notification: &Notification) {
        let Notification {
            level,
            title,
            message,
        } = notification;
        match level {
            NotificationLevel::Error => {
                tracing::warn!(title = %title, message = %message, "notification");
            }
            NotificationLevel::Success | NotificationLevel::Info => {
                log_at_level!(self.level, kind = %level, title = %title, message = %message, "notification");
            }
        }
    }
}
