use firewatch_core::lifecycle::{ConsoleSnapshot, MapLayers};
use firewatch_core::telemetry::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Payload served to the visualizer on every poll.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub snapshot: ConsoleSnapshot,
    pub layers: MapLayers,
    pub status: String,
    pub activity: Vec<String>,
    pub metrics: MetricsSnapshot,
}
