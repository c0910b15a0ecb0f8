//! Transient user-facing notifications.
//!
//! Views report every outcome the user should see through a [`Notifier`]
//! injected at the composition root. The front end decides how to show
//! them.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Success,
    Warning,
    Error,
}

impl Variant {
    /// Lowercase label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A message shown to the user once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub variant: Variant,
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            variant: Variant::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.variant.label(), self.message)
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn enqueue(&self, notification: Notification);
}

/// Notifier that buffers notifications until the front end drains them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    queue: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered notification, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notification> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    /// Number of buffered notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NotificationQueue {
    fn enqueue(&self, notification: Notification) {
        tracing::debug!(
            variant = notification.variant.label(),
            message = %notification.message,
            "Notification"
        );
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let queue = NotificationQueue::new();
        queue.enqueue(Notification::warning("first"));
        queue.enqueue(Notification::error("second"));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![Notification::warning("first"), Notification::error("second")]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_notification_display() {
        assert_eq!(
            Notification::success("Logged in successfully").to_string(),
            "[success] Logged in successfully"
        );
    }
}
