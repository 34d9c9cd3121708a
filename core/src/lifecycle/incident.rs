use crate::geo::LatLng;
use crate::impact::ImpactAssessment;
use crate::lifecycle::detection::Detection;
use crate::lifecycle::marker::{MarkerHandle, MarkerStyle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator-managed status of a confirmed incident. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    AwaitingResponse,
    ResponseDispatched,
    Resolved,
}

impl LifecycleStatus {
    pub const ALL: [LifecycleStatus; 3] = [
        LifecycleStatus::AwaitingResponse,
        LifecycleStatus::ResponseDispatched,
        LifecycleStatus::Resolved,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LifecycleStatus::AwaitingResponse => "Confirmed — Awaiting response",
            LifecycleStatus::ResponseDispatched => "Confirmed — Response dispatched",
            LifecycleStatus::Resolved => "Resolved",
        }
    }

    pub fn marker_style(self) -> MarkerStyle {
        match self {
            LifecycleStatus::AwaitingResponse => MarkerStyle::AwaitingResponse,
            LifecycleStatus::ResponseDispatched => MarkerStyle::ResponseDispatched,
            LifecycleStatus::Resolved => MarkerStyle::Resolved,
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operator-confirmed event; owns the marker its detection was drawn with.
#[derive(Debug)]
pub struct Incident {
    id: String,
    status: LifecycleStatus,
    confidence_pct: u8,
    location: LatLng,
    detected_at: DateTime<Utc>,
    confirmed_at: DateTime<Utc>,
    operator_note: String,
    impact: Option<ImpactAssessment>,
    marker: MarkerHandle,
}

impl Incident {
    pub(crate) fn from_detection(
        detection: &Detection,
        confirmed_at: DateTime<Utc>,
        impact: ImpactAssessment,
        marker: MarkerHandle,
    ) -> Self {
        Self {
            id: detection.id().to_string(),
            status: LifecycleStatus::AwaitingResponse,
            confidence_pct: detection.confidence_pct(),
            location: detection.location(),
            detected_at: detection.detected_at(),
            confirmed_at,
            operator_note: detection.operator_note().to_string(),
            impact: Some(impact),
            marker,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> LifecycleStatus {
        self.status
    }

    pub fn confidence_pct(&self) -> u8 {
        self.confidence_pct
    }

    pub fn location(&self) -> LatLng {
        self.location
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }

    pub fn operator_note(&self) -> &str {
        &self.operator_note
    }

    pub fn impact(&self) -> Option<&ImpactAssessment> {
        self.impact.as_ref()
    }

    pub fn marker(&self) -> &MarkerHandle {
        &self.marker
    }

    pub(crate) fn set_status(&mut self, status: LifecycleStatus) -> LifecycleStatus {
        std::mem::replace(&mut self.status, status)
    }
}

/// Append-only incident collection kept in insertion order.
#[derive(Debug, Default)]
pub struct IncidentLog {
    incidents: Vec<Incident>,
}

impl IncidentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, incident: Incident) {
        self.incidents.push(incident);
    }

    pub fn get(&self, id: &str) -> Option<&Incident> {
        self.incidents.iter().find(|incident| incident.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Incident> {
        self.incidents.iter_mut().find(|incident| incident.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter()
    }

    /// Display order.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_has_no_confirmed_prefix() {
        assert_eq!(
            LifecycleStatus::AwaitingResponse.label(),
            "Confirmed — Awaiting response"
        );
        assert_eq!(
            LifecycleStatus::ResponseDispatched.to_string(),
            "Confirmed — Response dispatched"
        );
        assert_eq!(LifecycleStatus::Resolved.label(), "Resolved");
    }

    #[test]
    fn status_maps_onto_marker_style() {
        assert_eq!(
            LifecycleStatus::Resolved.marker_style(),
            MarkerStyle::Resolved
        );
    }
}
