use crate::impact::ImpactConfig;
use serde::{Deserialize, Serialize};

pub use crate::clock::Clock;
pub use crate::random::RandomSource;

/// Half-open window `[min_ms, max_ms)` for the simulated analysis delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayWindow {
    pub min_ms: u64,
    pub max_ms: u64,
}

/// Inclusive window for the generated confidence percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceWindow {
    pub min: u8,
    pub max: u8,
}

/// Shared configuration for the operator console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Drags narrower than this (in degrees, on either axis) are treated as clicks.
    pub selection_epsilon_deg: f64,
    pub analysis_delay_ms: DelayWindow,
    pub confidence_pct: ConfidenceWindow,
    pub impact: ImpactConfig,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            selection_epsilon_deg: 0.002,
            analysis_delay_ms: DelayWindow {
                min_ms: 2000,
                max_ms: 3000,
            },
            confidence_pct: ConfidenceWindow { min: 82, max: 92 },
            impact: ImpactConfig::default(),
        }
    }
}

impl ConsoleSettings {
    pub fn validate(&self) -> ConsoleResult<()> {
        if !self.selection_epsilon_deg.is_finite() || self.selection_epsilon_deg <= 0.0 {
            return Err(ConsoleError::InvalidConfig(format!(
                "selection_epsilon_deg must be positive, got {}",
                self.selection_epsilon_deg
            )));
        }
        if self.analysis_delay_ms.min_ms >= self.analysis_delay_ms.max_ms {
            return Err(ConsoleError::InvalidConfig(format!(
                "analysis delay window [{}, {}) is empty",
                self.analysis_delay_ms.min_ms, self.analysis_delay_ms.max_ms
            )));
        }
        if self.confidence_pct.min > self.confidence_pct.max || self.confidence_pct.max > 100 {
            return Err(ConsoleError::InvalidConfig(format!(
                "confidence window [{}, {}] is not a valid percentage range",
                self.confidence_pct.min, self.confidence_pct.max
            )));
        }
        self.impact.validate()
    }
}

/// Common error type for the console core.
#[derive(thiserror::Error, Debug)]
pub enum ConsoleError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown incident: {0}")]
    NotFound(String),
    #[error("export unavailable: {0}")]
    ExportUnavailable(String),
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        ConsoleSettings::default().validate().unwrap();
    }

    #[test]
    fn empty_delay_window_is_rejected() {
        let settings = ConsoleSettings {
            analysis_delay_ms: DelayWindow {
                min_ms: 3000,
                max_ms: 3000,
            },
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConsoleError::InvalidConfig(_))
        ));
    }

    #[test]
    fn confidence_above_hundred_is_rejected() {
        let settings = ConsoleSettings {
            confidence_pct: ConfidenceWindow { min: 90, max: 120 },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
