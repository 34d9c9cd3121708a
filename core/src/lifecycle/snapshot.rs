use crate::geo::{GeoBounds, LatLng};
use crate::impact::ImpactAssessment;
use crate::lifecycle::detection::{Detection, DetectionState};
use crate::lifecycle::incident::{Incident, LifecycleStatus};
use crate::lifecycle::marker::MarkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionView {
    pub id: String,
    pub state: DetectionState,
    pub location: LatLng,
    pub confidence_pct: u8,
    pub detected_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub operator_note: String,
    pub marker: Option<MarkerId>,
}

impl From<&Detection> for DetectionView {
    fn from(detection: &Detection) -> Self {
        Self {
            id: detection.id().to_string(),
            state: detection.state(),
            location: detection.location(),
            confidence_pct: detection.confidence_pct(),
            detected_at: detection.detected_at(),
            confirmed_at: detection.confirmed_at(),
            operator_note: detection.operator_note().to_string(),
            marker: detection.marker().map(|marker| marker.id()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentView {
    pub id: String,
    pub status: LifecycleStatus,
    pub status_label: String,
    pub confidence_pct: u8,
    pub location: LatLng,
    pub detected_at: DateTime<Utc>,
    pub confirmed_at: DateTime<Utc>,
    pub operator_note: String,
    pub impact: Option<ImpactAssessment>,
    pub marker: MarkerId,
}

impl From<&Incident> for IncidentView {
    fn from(incident: &Incident) -> Self {
        Self {
            id: incident.id().to_string(),
            status: incident.status(),
            status_label: incident.status().label().to_string(),
            confidence_pct: incident.confidence_pct(),
            location: incident.location(),
            detected_at: incident.detected_at(),
            confirmed_at: incident.confirmed_at(),
            operator_note: incident.operator_note().to_string(),
            impact: incident.impact().cloned(),
            marker: incident.marker().id(),
        }
    }
}

/// Serializable read model of the console.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSnapshot {
    pub selection: Option<GeoBounds>,
    pub analysis_pending: bool,
    pub run_enabled: bool,
    pub detection: Option<DetectionView>,
    /// Newest first.
    pub incidents: Vec<IncidentView>,
    pub focused: Option<String>,
    pub export_enabled: bool,
}

impl ConsoleSnapshot {
    pub fn focused_incident(&self) -> Option<&IncidentView> {
        let focused = self.focused.as_deref()?;
        self.incidents.iter().find(|incident| incident.id == focused)
    }

    /// True while the live detection is waiting for confirm/reject.
    pub fn review_pending(&self) -> bool {
        self.detection
            .as_ref()
            .is_some_and(|detection| detection.state == DetectionState::Unconfirmed)
    }
}
