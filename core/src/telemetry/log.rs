use log::{debug, info};

/// Thin wrapper over the `log` facade for lifecycle transitions.
pub struct LogManager {
    target: &'static str,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            target: "firewatch::lifecycle",
        }
    }

    pub fn record(&self, message: &str) {
        info!(target: self.target, "{}", message);
    }

    pub fn transition(&self, id: &str, from: &str, to: &str) {
        info!(target: self.target, "{} {} -> {}", id, from, to);
    }

    /// Preconditions that were not met; the event is dropped.
    pub fn ignored(&self, event: &str, reason: &str) {
        debug!(target: self.target, "ignoring {}: {}", event, reason);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
