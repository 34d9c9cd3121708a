//! JSON export document for a confirmed incident.

use crate::geo::round_to;
use crate::lifecycle::Incident;
use crate::prelude::{ConsoleError, ConsoleResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const INCIDENT_STATUS: &str = "Confirmed Wildfire";
pub const DISCLAIMER: &str = "Demo / Non-operational data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentExport {
    pub incident_id: String,
    pub timestamp: String,
    pub incident_status: String,
    pub lifecycle_status: String,
    pub ai_detection: AiDetection,
    pub location: ExportLocation,
    pub impact_assessment: ExportImpact,
    pub operator_note: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDetection {
    pub confidence_pct: u8,
    pub detected_at_iso: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportImpact {
    pub spread_risk_level: String,
    pub estimated_affected_area_km2: f64,
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn iso_millis(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl IncidentExport {
    pub fn from_incident(incident: &Incident, exported_at: DateTime<Utc>) -> ConsoleResult<Self> {
        let impact = incident.impact().ok_or_else(|| {
            ConsoleError::ExportUnavailable(format!(
                "incident {} has no impact assessment",
                incident.id()
            ))
        })?;
        let location = incident.location();

        Ok(Self {
            incident_id: incident.id().to_string(),
            timestamp: iso_millis(exported_at),
            incident_status: INCIDENT_STATUS.to_string(),
            lifecycle_status: incident.status().label().to_string(),
            ai_detection: AiDetection {
                confidence_pct: incident.confidence_pct(),
                detected_at_iso: iso_millis(incident.detected_at()),
            },
            location: ExportLocation {
                lat: round_to(location.lat, 6),
                lng: round_to(location.lng, 6),
            },
            impact_assessment: ExportImpact {
                spread_risk_level: impact.tier.label().to_string(),
                estimated_affected_area_km2: round_to(impact.area_km2, 2),
            },
            operator_note: incident.operator_note().to_string(),
            disclaimer: DISCLAIMER.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("incident-{}.json", self.incident_id)
    }

    pub fn to_pretty_json(&self) -> ConsoleResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use crate::geo::LatLng;
    use crate::lifecycle::{ConsoleEvent, FireConsole};
    use crate::prelude::ConsoleSettings;
    use crate::random::SequenceRandom;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn confirmed_incident_exports_documented_schema() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        // delay, latitude, longitude, confidence, impact roll, jitter
        let draws = vec![0.5, 0.5, 0.5, 0.999_999, 0.9, 0.0];
        let mut console = FireConsole::new(
            ConsoleSettings::default(),
            SequenceRandom::new(draws),
            SteppingClock::new(start, 1000),
        )
        .unwrap();

        console.dispatch(ConsoleEvent::SelectBounds {
            corner_a: LatLng::new(38.0, 23.6),
            corner_b: LatLng::new(38.2, 23.9),
        });
        console.dispatch(ConsoleEvent::RunDetection);
        let run = console.pending_run().unwrap();
        console.dispatch(ConsoleEvent::AnalysisComplete { run });
        console.dispatch(ConsoleEvent::SetOperatorNote {
            note: "Smoke visible from ridge road".into(),
        });
        let id = console.detection().unwrap().id().to_string();
        console.dispatch(ConsoleEvent::Confirm {
            detection_id: id.clone(),
        });

        let export = console.export_focused().unwrap();
        assert_eq!(export.file_name(), "incident-WF-1719835200000.json");
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(
            value,
            json!({
                "incidentId": "WF-1719835200000",
                "timestamp": "2024-07-01T12:00:02.000Z",
                "incidentStatus": "Confirmed Wildfire",
                "lifecycleStatus": "Confirmed — Awaiting response",
                "aiDetection": {
                    "confidencePct": 92,
                    "detectedAtIso": "2024-07-01T12:00:00.000Z"
                },
                "location": { "lat": 38.1, "lng": 23.75 },
                "impactAssessment": {
                    "spreadRiskLevel": "High",
                    "estimatedAffectedAreaKm2": 13.59
                },
                "operatorNote": "Smoke visible from ridge road",
                "disclaimer": "Demo / Non-operational data"
            })
        );

        let parsed: IncidentExport =
            serde_json::from_str(&export.to_pretty_json().unwrap()).unwrap();
        assert_eq!(parsed, export);
    }

    #[test]
    fn iso_timestamps_carry_milliseconds_and_zulu() {
        let at = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 5).unwrap();
        assert_eq!(iso_millis(at), "2024-07-01T12:00:05.000Z");
    }
}
