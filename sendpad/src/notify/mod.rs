//! User-facing notifications (the toast surface).
//!
//! The session reports the outcome of connect, disconnect, balance reads and
//! transfers through a [`Notifier`]. Front ends plug in their own; the crate
//! ships a [`LoggingNotifier`], a [`NoopNotifier`] and a
//! [`RecordingNotifier`] that queues notifications for later rendering.
//!
//! Any `Fn(&Notification)` closure is also a notifier:
//!
//! ```rust
//! use sendpad::notify::{Notification, Notifier};
//!
//! let notifier = |n: &Notification| println!("{n}");
//! notifier.notify(&Notification::success("Wallet connected", "0xf39f…2266"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

mod logging;

pub use logging::{LogLevel, LoggingNotifier};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    /// An action succeeded.
    Success,
    /// Neutral information.
    Info,
    /// An action failed.
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        })
    }
}

/// One message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Short headline.
    pub title: String,
    /// Details.
    pub message: String,
}

impl Notification {
    /// Create a success notification.
    #[must_use]
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    /// Create an info notification.
    #[must_use]
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }

    /// Create an error notification.
    #[must_use]
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Whether this reports a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.level, NotificationLevel::Error)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "[{}] {}", self.level, self.title)
        } else {
            write!(f, "[{}] {}: {}", self.level, self.title, self.message)
        }
    }
}

/// Receives notifications.
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: &Notification);
}

impl<F> Notifier for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn notify(&self, notification: &Notification) {
        self(notification);
    }
}

/// Type alias for a boxed notifier.
pub type BoxedNotifier = Box<dyn Notifier>;

/// A notifier that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) {}
}

/// A notifier that keeps every notification.
///
/// Clones share the same queue, so one clone can be handed to a session
/// while another is drained by the renderer.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    queue: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn all(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    /// Remove and return everything recorded so far.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    /// The most recent notification.
    #[must_use]
    pub fn last(&self) -> Option<Notification> {
        self.lock().last().cloned()
    }

    /// Number of recorded notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.lock().push(notification.clone());
    }
}
