use std::sync::Mutex;

/// Channel for messages that must reach the user (geolocation failures).
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, message: &str) {
        tracing::warn!(target: "floodmap::alert", "{}", message);
    }
}

/// Keeps every alert in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl CollectingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }
}

impl AlertSink for CollectingAlertSink {
    fn alert(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}
