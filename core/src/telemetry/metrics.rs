use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct LifecycleMetrics {
    inner: Mutex<MetricsSnapshot>,
}

/// Counters accumulated over a console session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub runs_started: usize,
    pub detections: usize,
    pub confirmed: usize,
    pub rejected: usize,
    /// Unconfirmed detections replaced by a newer run.
    pub discarded: usize,
    pub status_changes: usize,
}

impl LifecycleMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn bump(&self, field: impl FnOnce(&mut MetricsSnapshot) -> &mut usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            *field(&mut *metrics) += 1;
        }
    }

    pub fn record_run(&self) {
        self.bump(|m| &mut m.runs_started);
    }

    pub fn record_detection(&self) {
        self.bump(|m| &mut m.detections);
    }

    pub fn record_confirmed(&self) {
        self.bump(|m| &mut m.confirmed);
    }

    pub fn record_rejected(&self) {
        self.bump(|m| &mut m.rejected);
    }

    pub fn record_discarded(&self) {
        self.bump(|m| &mut m.discarded);
    }

    pub fn record_status_change(&self) {
        self.bump(|m| &mut m.status_changes);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for LifecycleMetrics {
    fn default() -> Self {
        Self::new()
    }
}
