//! Illustrative spread-risk estimate attached to a confirmed detection.
//!
//! The estimate is not a fire model: a single uniform roll, nudged upward by
//! the detection confidence, picks one of three tiers, and each tier carries a
//! base radius plus jitter. Thresholds and radii are configuration values.

use crate::geo::AreaHelper;
use crate::prelude::{ConsoleError, ConsoleResult};
use crate::random::{uniform_range, RandomSource};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spread-risk tier, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    fn note_clauses(self) -> (&'static str, &'static str) {
        match self {
            RiskTier::Low => (
                "Light, variable winds favour slow surface spread.",
                "Flat terrain and sparse fuel limit the fire front.",
            ),
            RiskTier::Medium => (
                "Moderate sustained winds can push the front downwind.",
                "Mixed slopes and shrubland allow steady growth.",
            ),
            RiskTier::High => (
                "Strong gusting winds may carry embers ahead of the front.",
                "Steep slopes and dense dry fuel accelerate uphill runs.",
            ),
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Base radius per tier, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRadii {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl TierRadii {
    pub fn for_tier(&self, tier: RiskTier) -> f64 {
        match tier {
            RiskTier::Low => self.low,
            RiskTier::Medium => self.medium,
            RiskTier::High => self.high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    /// Rolls at or above this value are at least `Medium`.
    pub medium_threshold: f64,
    /// Rolls at or above this value are `High`.
    pub high_threshold: f64,
    pub confidence_floor: f64,
    pub confidence_span: f64,
    pub nudge_weight: f64,
    pub base_radius_m: TierRadii,
    pub jitter_min_m: f64,
    pub jitter_max_m: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            medium_threshold: 0.55,
            high_threshold: 1.05,
            confidence_floor: 82.0,
            confidence_span: 10.0,
            nudge_weight: 0.25,
            base_radius_m: TierRadii {
                low: 900.0,
                medium: 1400.0,
                high: 2200.0,
            },
            jitter_min_m: -120.0,
            jitter_max_m: 180.0,
        }
    }
}

impl ImpactConfig {
    pub fn validate(&self) -> ConsoleResult<()> {
        let fields = [
            ("medium_threshold", self.medium_threshold),
            ("high_threshold", self.high_threshold),
            ("confidence_floor", self.confidence_floor),
            ("confidence_span", self.confidence_span),
            ("nudge_weight", self.nudge_weight),
            ("base_radius_m.low", self.base_radius_m.low),
            ("base_radius_m.medium", self.base_radius_m.medium),
            ("base_radius_m.high", self.base_radius_m.high),
            ("jitter_min_m", self.jitter_min_m),
            ("jitter_max_m", self.jitter_max_m),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConsoleError::InvalidConfig(format!(
                "impact {} must be finite, got {}",
                name, value
            )));
        }
        if self.medium_threshold > self.high_threshold {
            return Err(ConsoleError::InvalidConfig(format!(
                "impact thresholds out of order: medium {} > high {}",
                self.medium_threshold, self.high_threshold
            )));
        }
        if self.confidence_span <= 0.0 {
            return Err(ConsoleError::InvalidConfig(
                "impact confidence_span must be positive".into(),
            ));
        }
        if self.jitter_min_m > self.jitter_max_m {
            return Err(ConsoleError::InvalidConfig(format!(
                "impact jitter window [{}, {}] is inverted",
                self.jitter_min_m, self.jitter_max_m
            )));
        }
        let smallest = RiskTier::ALL
            .iter()
            .map(|tier| self.base_radius_m.for_tier(*tier))
            .fold(f64::INFINITY, f64::min);
        if smallest + self.jitter_min_m <= 0.0 {
            return Err(ConsoleError::InvalidConfig(
                "impact radius can drop to zero or below".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub tier: RiskTier,
    pub radius_m: u32,
    pub area_km2: f64,
    pub notes: String,
}

impl ImpactAssessment {
    /// Area with one decimal, as shown in the incident panel.
    pub fn area_display(&self) -> String {
        let tenths = (self.area_km2 * 10.0).trunc() / 10.0;
        format!("{:.1} km²", tenths)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImpactEstimator {
    config: ImpactConfig,
}

impl ImpactEstimator {
    pub fn new(config: ImpactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ImpactConfig {
        &self.config
    }

    /// Maps the configured confidence range onto roughly `[0, 1]`.
    pub fn nudge(&self, confidence_pct: u8) -> f64 {
        (f64::from(confidence_pct) - self.config.confidence_floor) / self.config.confidence_span
    }

    pub fn roll(&self, confidence_pct: u8, draw: f64) -> f64 {
        draw + self.nudge(confidence_pct) * self.config.nudge_weight
    }

    pub fn select_tier(&self, confidence_pct: u8, draw: f64) -> RiskTier {
        let roll = self.roll(confidence_pct, draw);
        if roll < self.config.medium_threshold {
            RiskTier::Low
        } else if roll < self.config.high_threshold {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn notes_for(tier: RiskTier) -> String {
        let (wind, terrain) = tier.note_clauses();
        format!("{} {}", wind, terrain)
    }

    /// Draws the tier roll first, then the radius jitter.
    pub fn assess<R: RandomSource + ?Sized>(
        &self,
        confidence_pct: u8,
        rng: &mut R,
    ) -> ImpactAssessment {
        let tier = self.select_tier(confidence_pct, rng.next_unit());
        let jitter = uniform_range(rng, self.config.jitter_min_m, self.config.jitter_max_m);
        let radius = (self.config.base_radius_m.for_tier(tier) + jitter).round().max(0.0);
        let radius_m = radius as u32;

        ImpactAssessment {
            tier,
            radius_m,
            area_km2: AreaHelper::circle_km2(f64::from(radius_m)),
            notes: Self::notes_for(tier),
        }
    }
}
