use chrono::{DateTime, Duration, Utc};

/// Wall-clock seam used for detection, confirmation and export timestamps.
pub trait Clock {
    fn now(&mut self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every reading.
#[derive(Debug, Clone)]
pub struct SteppingClock {
    next: DateTime<Utc>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step_ms: i64) -> Self {
        Self {
            next: start,
            step: Duration::milliseconds(step_ms),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&mut self) -> DateTime<Utc> {
        let current = self.next;
        self.next = current + self.step;
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stepping_clock_advances_per_reading() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let mut clock = SteppingClock::new(start, 1500);
        assert_eq!(clock.now(), start);
        assert_eq!(clock.now(), start + Duration::milliseconds(1500));
    }
}
