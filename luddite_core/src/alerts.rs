//! Alert queue for user-visible reports.
//!
//! Store failures and other problems the user must see are queued here; the
//! front end shows them as dismissible alerts.

use std::collections::VecDeque;
use std::time::Instant;

/// Type of alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Something went wrong and the user should know.
    Error,
    /// Informational message.
    Info,
}

/// A single alert.
#[derive(Debug, Clone)]
pub struct Alert {
    /// The headline.
    pub message: String,
    /// Optional longer explanation or recovery suggestion.
    pub informative: Option<String>,
    pub kind: AlertKind,
    /// When the alert was raised.
    pub raised_at: Instant,
}

impl Alert {
    /// Creates a new alert.
    pub fn new(message: impl Into<String>, kind: AlertKind) -> Self {
        Self {
            message: message.into(),
            informative: None,
            kind,
            raised_at: Instant::now(),
        }
    }

    /// Attaches a longer explanation.
    pub fn with_informative(mut self, text: impl Into<String>) -> Self {
        self.informative = Some(text.into());
        self
    }
}

/// Pending alerts, oldest first.
#[derive(Debug)]
pub struct Alerts {
    queue: VecDeque<Alert>,
    /// Maximum number of alerts kept; older ones are discarded.
    capacity: usize,
}

impl Default for Alerts {
    fn default() -> Self {
        Self::new()
    }
}

impl Alerts {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: 20,
        }
    }

    /// Queues an alert.
    pub fn push(&mut self, alert: Alert) {
        self.queue.push_back(alert);
        while self.queue.len() > self.capacity {
            self.queue.pop_front();
        }
    }

    /// Queues an error alert.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Alert::new(message, AlertKind::Error));
    }

    /// Queues an info alert.
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Alert::new(message, AlertKind::Info));
    }

    /// The alert the user should see next.
    pub fn current(&self) -> Option<&Alert> {
        self.queue.front()
    }

    /// Dismisses the current alert.
    pub fn dismiss(&mut self) -> Option<Alert> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterates pending alerts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_creation() {
        let alert = Alert::new("Could not save", AlertKind::Error).with_informative("offline");
        assert_eq!(alert.message, "Could not save");
        assert_eq!(alert.informative.as_deref(), Some("offline"));
    }

    #[test]
    fn test_dismiss_in_order() {
        let mut alerts = Alerts::new();
        alerts.error("first");
        alerts.info("second");
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts.dismiss().unwrap().message, "first");
        assert_eq!(alerts.current().unwrap().kind, AlertKind::Info);
        alerts.dismiss();
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut alerts = Alerts::new();
        for i in 0..25 {
            alerts.error(format!("alert {i}"));
        }
        assert_eq!(alerts.len(), 20);
        assert_eq!(alerts.current().unwrap().message, "alert 5");
    }
}
