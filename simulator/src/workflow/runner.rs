use crate::scenario::script::{ScenarioScript, ScriptStep, LAST_DETECTION, LAST_INCIDENT};
use crate::workflow::session::Session;
use anyhow::Context;
use firewatch_core::export::IncidentExport;
use firewatch_core::lifecycle::MapLayers;
use firewatch_core::prelude::{Clock, RandomSource};
use firewatch_core::telemetry::MetricsSnapshot;
use firewatch_core::{ConsoleEvent, Effect};
use log::info;
use std::thread;

/// How the runner honours `ScheduleAnalysis` effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayMode {
    Real,
    Skip,
}

pub struct SessionResult {
    pub incidents: usize,
    pub exports: Vec<IncidentExport>,
    pub layers: MapLayers,
    pub activity: Vec<String>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    delay: DelayMode,
}

impl Runner {
    pub fn new(delay: DelayMode) -> Self {
        Self { delay }
    }

    pub fn execute<R: RandomSource, C: Clock>(
        &self,
        session: &mut Session<R, C>,
        script: &ScenarioScript,
    ) -> anyhow::Result<SessionResult> {
        info!("running scenario {} ({} steps)", script.name, script.steps.len());
        let mut exports = Vec::new();

        for (index, step) in script.steps.iter().enumerate() {
            match step {
                ScriptStep::Dispatch { event } => {
                    let event = resolve_placeholders(event.clone(), session);
                    let effects = session.dispatch(event);
                    self.run_scheduled(session, &effects);
                }
                ScriptStep::Export => {
                    let export = session
                        .console_mut()
                        .export_focused()
                        .with_context(|| format!("exporting at step {}", index + 1))?;
                    exports.push(export);
                }
            }
        }

        Ok(SessionResult {
            incidents: session.console().incidents().len(),
            exports,
            layers: session.layers().clone(),
            activity: session.activity().cloned().collect(),
            metrics: session.console().metrics().snapshot(),
        })
    }

    fn run_scheduled<R: RandomSource, C: Clock>(
        &self,
        session: &mut Session<R, C>,
        effects: &[Effect],
    ) {
        for (run, delay) in effects.iter().filter_map(Effect::scheduled_analysis) {
            if self.delay == DelayMode::Real {
                thread::sleep(delay);
            }
            session.dispatch(ConsoleEvent::AnalysisComplete { run });
        }
    }
}

fn resolve_placeholders<R: RandomSource, C: Clock>(
    event: ConsoleEvent,
    session: &Session<R, C>,
) -> ConsoleEvent {
    let console = session.console();
    let last_detection = || {
        console
            .detection()
            .map(|detection| detection.id().to_string())
            .unwrap_or_default()
    };
    let last_incident = || {
        console
            .incidents()
            .iter_newest_first()
            .next()
            .map(|incident| incident.id().to_string())
            .unwrap_or_default()
    };

    match event {
        ConsoleEvent::Confirm { detection_id } if detection_id == LAST_DETECTION => {
            ConsoleEvent::Confirm {
                detection_id: last_detection(),
            }
        }
        ConsoleEvent::Reject { detection_id } if detection_id == LAST_DETECTION => {
            ConsoleEvent::Reject {
                detection_id: last_detection(),
            }
        }
        ConsoleEvent::SetStatus {
            incident_id,
            status,
        } if incident_id == LAST_INCIDENT => ConsoleEvent::SetStatus {
            incident_id: last_incident(),
            status,
        },
        ConsoleEvent::FocusIncident { incident_id } if incident_id == LAST_INCIDENT => {
            ConsoleEvent::FocusIncident {
                incident_id: last_incident(),
            }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::config::SimulatorConfig;
    use crate::workflow::session::build_console;
    use firewatch_core::lifecycle::{LifecycleStatus, MarkerStyle};

    fn seeded_session() -> crate::workflow::session::LiveSession {
        let config = SimulatorConfig {
            seed: Some(11),
            ..Default::default()
        };
        Session::new(build_console(&config).unwrap())
    }

    #[test]
    fn default_session_confirms_and_exports() {
        let mut session = seeded_session();
        let runner = Runner::new(DelayMode::Skip);
        let result = runner
            .execute(&mut session, &ScenarioScript::default_session())
            .unwrap();

        assert_eq!(result.incidents, 1);
        assert_eq!(result.exports.len(), 1);
        let export = &result.exports[0];
        assert_eq!(
            export.lifecycle_status,
            LifecycleStatus::ResponseDispatched.label()
        );
        assert_eq!(export.operator_note, "Smoke plume reported by lookout tower");
        assert_eq!(result.layers.markers.len(), 1);
        assert_eq!(
            result.layers.markers[0].style,
            MarkerStyle::ResponseDispatched
        );
        assert_eq!(result.layers.circles.len(), 1);
        assert_eq!(result.metrics.confirmed, 1);
    }

    #[test]
    fn rejected_session_fails_to_export() {
        let mut session = seeded_session();
        let mut script = ScenarioScript::default_session();
        script.steps = vec![
            script.steps[0].clone(),
            script.steps[1].clone(),
            ScriptStep::Dispatch {
                event: ConsoleEvent::Reject {
                    detection_id: LAST_DETECTION.into(),
                },
            },
            ScriptStep::Export,
        ];

        let runner = Runner::new(DelayMode::Skip);
        assert!(runner.execute(&mut session, &script).is_err());
        assert!(session.console().incidents().is_empty());
        assert!(session.layers().markers.is_empty());
    }
}
