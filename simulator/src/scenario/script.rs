use anyhow::Context;
use firewatch_core::geo::LatLng;
use firewatch_core::lifecycle::LifecycleStatus;
use firewatch_core::ConsoleEvent;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Resolved to the id of the live detection when the step runs.
pub const LAST_DETECTION: &str = "$last_detection";
/// Resolved to the id of the newest incident when the step runs.
pub const LAST_INCIDENT: &str = "$last_incident";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScriptStep {
    Dispatch { event: ConsoleEvent },
    /// Export the focused incident.
    Export,
}

/// Operator session replayed by the offline runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioScript {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub steps: Vec<ScriptStep>,
}

impl ScenarioScript {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario script {}", path_ref.display()))?;
        let script: ScenarioScript = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario script {}", path_ref.display()))?;
        Ok(script)
    }

    /// Select, detect, confirm, dispatch a response and export.
    pub fn default_session() -> Self {
        let dispatch = |event| ScriptStep::Dispatch { event };
        Self {
            name: "default".into(),
            description: Some("single confirmed incident with dispatched response".into()),
            steps: vec![
                dispatch(ConsoleEvent::SelectBounds {
                    corner_a: LatLng::new(38.05, 23.70),
                    corner_b: LatLng::new(38.20, 23.95),
                }),
                dispatch(ConsoleEvent::RunDetection),
                dispatch(ConsoleEvent::SetOperatorNote {
                    note: "Smoke plume reported by lookout tower".into(),
                }),
                dispatch(ConsoleEvent::Confirm {
                    detection_id: LAST_DETECTION.into(),
                }),
                dispatch(ConsoleEvent::SetStatus {
                    incident_id: LAST_INCIDENT.into(),
                    status: LifecycleStatus::ResponseDispatched,
                }),
                ScriptStep::Export,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn script_load_reads_yaml_steps() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"name: reject-then-confirm
steps:
  - step: dispatch
    event:
      type: select_bounds
      corner_a: { lat: 38.0, lng: 23.6 }
      corner_b: { lat: 38.2, lng: 23.9 }
  - step: dispatch
    event: { type: run_detection }
  - step: dispatch
    event: { type: reject, detection_id: "$last_detection" }
  - step: export
"#,
        )
        .unwrap();
        let path = temp.into_temp_path();
        let script = ScenarioScript::load(&path).unwrap();
        assert_eq!(script.name, "reject-then-confirm");
        assert_eq!(script.steps.len(), 4);
        assert_eq!(
            script.steps[2],
            ScriptStep::Dispatch {
                event: ConsoleEvent::Reject {
                    detection_id: LAST_DETECTION.into()
                }
            }
        );
        assert_eq!(script.steps[3], ScriptStep::Export);
    }

    #[test]
    fn default_session_ends_with_export() {
        let script = ScenarioScript::default_session();
        assert_eq!(script.steps.last(), Some(&ScriptStep::Export));
    }

    #[test]
    fn bundled_script_parses() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("scenarios/reject_then_confirm.yaml");
        let script = ScenarioScript::load(&path).unwrap();
        assert_eq!(script.steps.len(), 8);
        assert_eq!(script.steps.last(), Some(&ScriptStep::Export));
    }
}
