use crate::export::IncidentExport;
use crate::geo::{GeoBounds, LatLng};
use crate::impact::ImpactEstimator;
use crate::lifecycle::detection::Detection;
use crate::lifecycle::event::{ConsoleEvent, Effect};
use crate::lifecycle::incident::{Incident, IncidentLog, LifecycleStatus};
use crate::lifecycle::marker::{MarkerAllocator, MarkerStyle};
use crate::lifecycle::snapshot::{ConsoleSnapshot, DetectionView, IncidentView};
use crate::prelude::{Clock, ConsoleError, ConsoleResult, ConsoleSettings, RandomSource};
use crate::random::{uniform_int_inclusive, uniform_range};
use crate::telemetry::{LifecycleMetrics, LogManager};
use chrono::{DateTime, Utc};

/// Bounds captured when a run was requested, tagged with that run's number.
struct PendingAnalysis {
    run: u64,
    bounds: GeoBounds,
}

/// Single owner of all console state; every change goes through [`FireConsole::dispatch`].
pub struct FireConsole<R, C> {
    settings: ConsoleSettings,
    estimator: ImpactEstimator,
    rng: R,
    clock: C,
    selection: Option<GeoBounds>,
    pending: Option<PendingAnalysis>,
    runs: u64,
    detection: Option<Detection>,
    incidents: IncidentLog,
    focused: Option<String>,
    markers: MarkerAllocator,
    last_id_ms: Option<i64>,
    logger: LogManager,
    metrics: LifecycleMetrics,
}

impl<R: RandomSource, C: Clock> FireConsole<R, C> {
    pub fn new(settings: ConsoleSettings, rng: R, clock: C) -> ConsoleResult<Self> {
        settings.validate()?;
        Ok(Self {
            estimator: ImpactEstimator::new(settings.impact.clone()),
            settings,
            rng,
            clock,
            selection: None,
            pending: None,
            runs: 0,
            detection: None,
            incidents: IncidentLog::new(),
            focused: None,
            markers: MarkerAllocator::default(),
            last_id_ms: None,
            logger: LogManager::new(),
            metrics: LifecycleMetrics::new(),
        })
    }

    pub fn dispatch(&mut self, event: ConsoleEvent) -> Vec<Effect> {
        match event {
            ConsoleEvent::SelectBounds { corner_a, corner_b } => {
                self.select_bounds(corner_a, corner_b)
            }
            ConsoleEvent::ClearSelection => self.clear_selection(),
            ConsoleEvent::RunDetection => self.run_detection(),
            ConsoleEvent::AnalysisComplete { run } => self.complete_analysis(run),
            ConsoleEvent::SetOperatorNote { note } => self.set_operator_note(note),
            ConsoleEvent::Confirm { detection_id } => self.confirm(&detection_id),
            ConsoleEvent::Reject { detection_id } => self.reject(&detection_id),
            ConsoleEvent::SetStatus {
                incident_id,
                status,
            } => self.set_status(&incident_id, status),
            ConsoleEvent::FocusIncident { incident_id } => self.focus(&incident_id),
        }
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn selection(&self) -> Option<GeoBounds> {
        self.selection
    }

    pub fn is_analysis_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of the run whose analysis is outstanding.
    pub fn pending_run(&self) -> Option<u64> {
        self.pending.as_ref().map(|pending| pending.run)
    }

    pub fn run_enabled(&self) -> bool {
        self.selection.is_some() && self.pending.is_none()
    }

    pub fn detection(&self) -> Option<&Detection> {
        self.detection.as_ref()
    }

    pub fn incidents(&self) -> &IncidentLog {
        &self.incidents
    }

    pub fn focused_incident(&self) -> Option<&Incident> {
        self.focused
            .as_deref()
            .and_then(|id| self.incidents.get(id))
    }

    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            selection: self.selection,
            analysis_pending: self.pending.is_some(),
            run_enabled: self.run_enabled(),
            detection: self.detection.as_ref().map(DetectionView::from),
            incidents: self
                .incidents
                .iter_newest_first()
                .map(IncidentView::from)
                .collect(),
            focused: self.focused.clone(),
            export_enabled: self
                .focused_incident()
                .is_some_and(|incident| incident.impact().is_some()),
        }
    }

    pub fn export_focused(&mut self) -> ConsoleResult<IncidentExport> {
        let id = self
            .focused
            .clone()
            .ok_or_else(|| ConsoleError::ExportUnavailable("no incident is focused".into()))?;
        self.export_incident(&id)
    }

    pub fn export_incident(&mut self, id: &str) -> ConsoleResult<IncidentExport> {
        let incident = self
            .incidents
            .get(id)
            .ok_or_else(|| ConsoleError::NotFound(id.to_string()))?;
        IncidentExport::from_incident(incident, self.clock.now())
    }

    fn select_bounds(&mut self, corner_a: LatLng, corner_b: LatLng) -> Vec<Effect> {
        let bounds = GeoBounds::from_corners(corner_a, corner_b);
        if bounds.is_tiny(self.settings.selection_epsilon_deg) {
            self.logger
                .ignored("select_bounds", "drag below selection epsilon");
            self.selection = None;
            return vec![
                Effect::ClearSelection,
                Effect::SetRunEnabled {
                    enabled: self.run_enabled(),
                },
                Effect::Notify {
                    message: "Selection too small; drag a larger area.".into(),
                },
            ];
        }

        self.selection = Some(bounds);
        self.logger.record(&format!(
            "area selected {:.4}° x {:.4}°",
            bounds.lat_span(),
            bounds.lng_span()
        ));
        vec![
            Effect::DrawSelection { bounds },
            Effect::SetRunEnabled {
                enabled: self.run_enabled(),
            },
        ]
    }

    fn clear_selection(&mut self) -> Vec<Effect> {
        self.selection = None;
        vec![
            Effect::ClearSelection,
            Effect::SetRunEnabled {
                enabled: self.run_enabled(),
            },
        ]
    }

    fn run_detection(&mut self) -> Vec<Effect> {
        if self.pending.is_some() {
            self.logger.ignored("run_detection", "analysis already pending");
            return Vec::new();
        }
        let Some(bounds) = self.selection else {
            self.logger.ignored("run_detection", "no area selected");
            return Vec::new();
        };

        let window = self.settings.analysis_delay_ms;
        let delay_ms = (uniform_range(&mut self.rng, window.min_ms as f64, window.max_ms as f64)
            .floor() as u64)
            .min(window.max_ms - 1);
        self.runs += 1;
        let run = self.runs;
        self.pending = Some(PendingAnalysis { run, bounds });
        self.metrics.record_run();
        self.logger
            .record(&format!("analysis run {} scheduled in {} ms", run, delay_ms));

        vec![
            Effect::SetRunEnabled { enabled: false },
            Effect::ScheduleAnalysis { run, delay_ms },
            Effect::Notify {
                message: "Analysing selected area...".into(),
            },
        ]
    }

    fn complete_analysis(&mut self, run: u64) -> Vec<Effect> {
        let Some(pending) = self.pending.take_if(|pending| pending.run == run) else {
            self.logger
                .ignored("analysis_complete", "no pending analysis for that run");
            return Vec::new();
        };

        let mut effects = Vec::new();
        if let Some(previous) = self.detection.take() {
            if previous.is_pending() {
                self.logger.transition(previous.id(), "unconfirmed", "discarded");
                self.metrics.record_discarded();
            }
            if let Some(marker) = previous.into_marker() {
                effects.push(Effect::RemoveMarker {
                    marker: marker.id(),
                });
            }
        }

        let location = pending.bounds.sample_point(&mut self.rng);
        let window = self.settings.confidence_pct;
        let confidence_pct =
            uniform_int_inclusive(&mut self.rng, i64::from(window.min), i64::from(window.max)) as u8;
        let detected_at = self.clock.now();
        let id = self.next_id(detected_at);
        let marker = self.markers.allocate();

        effects.push(Effect::PlaceMarker {
            marker: marker.id(),
            location,
            style: MarkerStyle::Unconfirmed,
        });
        effects.push(Effect::SetRunEnabled {
            enabled: self.run_enabled(),
        });
        effects.push(Effect::Notify {
            message: format!("Possible wildfire detected ({}% confidence)", confidence_pct),
        });

        self.logger.record(&format!(
            "detection {} at ({:.5}, {:.5}) confidence {}%",
            id, location.lat, location.lng, confidence_pct
        ));
        self.metrics.record_detection();
        self.detection = Some(Detection::new(
            id,
            pending.bounds,
            location,
            confidence_pct,
            detected_at,
            marker,
        ));
        effects
    }

    fn set_operator_note(&mut self, note: String) -> Vec<Effect> {
        match self.detection.as_mut().filter(|d| d.is_pending()) {
            Some(detection) => detection.set_operator_note(note),
            None => self
                .logger
                .ignored("set_operator_note", "no detection awaiting review"),
        }
        Vec::new()
    }

    fn confirm(&mut self, detection_id: &str) -> Vec<Effect> {
        let Some(detection) = self
            .detection
            .as_mut()
            .filter(|d| d.id() == detection_id && d.is_pending())
        else {
            self.logger
                .ignored("confirm", "no unconfirmed detection with that id");
            return Vec::new();
        };

        let confirmed_at = self.clock.now();
        let Some(marker) = detection.mark_confirmed(confirmed_at) else {
            return Vec::new();
        };
        let impact = self
            .estimator
            .assess(detection.confidence_pct(), &mut self.rng);
        let incident = Incident::from_detection(detection, confirmed_at, impact.clone(), marker);
        let incident_id = incident.id().to_string();
        let marker_id = incident.marker().id();

        let effects = vec![
            Effect::RestyleMarker {
                marker: marker_id,
                style: incident.status().marker_style(),
            },
            Effect::DrawImpact {
                marker: marker_id,
                center: incident.location(),
                radius_m: impact.radius_m,
                tier: impact.tier,
            },
            Effect::FocusIncident {
                incident_id: incident_id.clone(),
            },
            Effect::Notify {
                message: format!(
                    "Incident {} confirmed: {} spread risk, ~{}",
                    incident_id,
                    impact.tier,
                    impact.area_display()
                ),
            },
        ];

        self.logger
            .transition(&incident_id, "unconfirmed", "confirmed");
        self.metrics.record_confirmed();
        self.incidents.push(incident);
        self.focused = Some(incident_id);
        effects
    }

    fn reject(&mut self, detection_id: &str) -> Vec<Effect> {
        let Some(detection) = self
            .detection
            .as_mut()
            .filter(|d| d.id() == detection_id && d.is_pending())
        else {
            self.logger
                .ignored("reject", "no unconfirmed detection with that id");
            return Vec::new();
        };

        let Some(marker) = detection.mark_rejected() else {
            return Vec::new();
        };
        let effects = vec![
            Effect::RemoveImpact {
                marker: marker.id(),
            },
            Effect::RemoveMarker {
                marker: marker.id(),
            },
            Effect::Notify {
                message: "Detection rejected.".into(),
            },
        ];

        self.logger
            .transition(detection_id, "unconfirmed", "rejected");
        self.metrics.record_rejected();
        effects
    }

    fn set_status(&mut self, incident_id: &str, status: LifecycleStatus) -> Vec<Effect> {
        let Some(incident) = self.incidents.get_mut(incident_id) else {
            self.logger.ignored("set_status", "unknown incident");
            return Vec::new();
        };

        let previous = incident.set_status(status);
        let marker = incident.marker().id();
        self.logger
            .transition(incident_id, previous.label(), status.label());
        self.metrics.record_status_change();

        vec![
            Effect::RestyleMarker {
                marker,
                style: status.marker_style(),
            },
            Effect::Notify {
                message: format!("{}: {}", incident_id, status.label()),
            },
        ]
    }

    fn focus(&mut self, incident_id: &str) -> Vec<Effect> {
        if self.incidents.get(incident_id).is_none() {
            self.logger.ignored("focus_incident", "unknown incident");
            return Vec::new();
        }
        self.focused = Some(incident_id.to_string());
        vec![Effect::FocusIncident {
            incident_id: incident_id.to_string(),
        }]
    }

    /// Time-derived id, bumped past the previous one when the clock has not advanced.
    fn next_id(&mut self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        let millis = match self.last_id_ms {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last_id_ms = Some(millis);
        format!("WF-{}", millis)
    }
}
