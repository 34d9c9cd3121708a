use crate::geo::{GeoBounds, LatLng};
use crate::impact::RiskTier;
use crate::lifecycle::incident::LifecycleStatus;
use crate::lifecycle::marker::{MarkerId, MarkerStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Input to the console reducer: operator actions plus the analysis timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleEvent {
    SelectBounds { corner_a: LatLng, corner_b: LatLng },
    ClearSelection,
    RunDetection,
    /// Fired by the driver once the delay armed for `run` has elapsed.
    AnalysisComplete { run: u64 },
    SetOperatorNote { note: String },
    Confirm { detection_id: String },
    Reject { detection_id: String },
    SetStatus {
        incident_id: String,
        status: LifecycleStatus,
    },
    FocusIncident { incident_id: String },
}

/// Work the presentation layer or driver must carry out after a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    DrawSelection {
        bounds: GeoBounds,
    },
    ClearSelection,
    ScheduleAnalysis {
        run: u64,
        delay_ms: u64,
    },
    SetRunEnabled {
        enabled: bool,
    },
    PlaceMarker {
        marker: MarkerId,
        location: LatLng,
        style: MarkerStyle,
    },
    RestyleMarker {
        marker: MarkerId,
        style: MarkerStyle,
    },
    RemoveMarker {
        marker: MarkerId,
    },
    DrawImpact {
        marker: MarkerId,
        center: LatLng,
        radius_m: u32,
        tier: RiskTier,
    },
    RemoveImpact {
        marker: MarkerId,
    },
    FocusIncident {
        incident_id: String,
    },
    Notify {
        message: String,
    },
}

impl ConsoleEvent {
    /// Events only a driver timer may raise, never an operator.
    pub fn is_timer_only(&self) -> bool {
        matches!(self, ConsoleEvent::AnalysisComplete { .. })
    }
}

impl Effect {
    /// Run number and delay of a scheduled analysis.
    pub fn scheduled_analysis(&self) -> Option<(u64, Duration)> {
        match self {
            Effect::ScheduleAnalysis { run, delay_ms } => {
                Some((*run, Duration::from_millis(*delay_ms)))
            }
            _ => None,
        }
    }

    /// The event that completes a scheduled analysis once its delay is over.
    pub fn completion(&self) -> Option<ConsoleEvent> {
        self.scheduled_analysis()
            .map(|(run, _)| ConsoleEvent::AnalysisComplete { run })
    }
}
