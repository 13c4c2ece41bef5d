// SPDX-License-Identifier: MIT OR Apache-2.0
//! User-facing notifications.
//!
//! Notifications are fire-and-forget: the graph surface hands them to a
//! [`NotificationSink`] and never waits for or reads back a result.

use std::collections::VecDeque;
use std::fmt;

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Operation succeeded
    Success,
    /// Operation was rejected
    Error,
}

impl Severity {
    /// Color for this severity (for UI)
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Success => [100, 200, 120],
            Self::Error => [255, 100, 100],
        }
    }
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub severity: Severity,
    /// One-line summary
    pub summary: String,
    /// Longer detail
    pub detail: String,
}

impl Notification {
    /// A success notification
    pub fn success(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// An error notification
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

/// Receiver of notifications
pub trait NotificationSink {
    /// Deliver one notification
    fn notify(&mut self, notification: Notification);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}

/// Sink that keeps the most recent notifications
#[derive(Debug, Clone)]
pub struct NotificationLog {
    entries: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationLog {
    /// Create a log keeping at most `capacity` notifications
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Notifications, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &Notification> {
        self.entries.iter()
    }

    /// Most recent notification
    pub fn latest(&self) -> Option<&Notification> {
        self.entries.back()
    }

    /// Number of retained notifications
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all notifications
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl NotificationSink for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        self.entries.push_back(notification);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_most_recent() {
        let mut log = NotificationLog::new(2);
        log.notify(Notification::success("one", ""));
        log.notify(Notification::error("two", ""));
        log.notify(Notification::success("three", ""));

        let summaries: Vec<_> = log.entries().map(|n| n.summary.as_str()).collect();
        assert_eq!(summaries, vec!["two", "three"]);
        assert_eq!(log.latest().map(|n| n.severity), Some(Severity::Success));
    }
}
