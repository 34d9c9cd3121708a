//! Detection/incident lifecycle.
//!
//! A run over the selected bounds yields at most one live [`Detection`]. The
//! operator confirms it (producing an [`Incident`] that takes over its map
//! marker) or rejects it (the marker is dropped). All mutation goes through
//! [`FireConsole::dispatch`], which returns the [`Effect`]s a presentation
//! layer must apply.

pub mod console;
pub mod detection;
pub mod event;
pub mod incident;
pub mod layers;
pub mod marker;
pub mod snapshot;

pub use console::FireConsole;
pub use detection::{Detection, DetectionState};
pub use event::{ConsoleEvent, Effect};
pub use incident::{Incident, IncidentLog, LifecycleStatus};
pub use layers::{ImpactCircle, MapLayers, MapMarker};
pub use marker::{MarkerAllocator, MarkerHandle, MarkerId, MarkerStyle};
pub use snapshot::{ConsoleSnapshot, DetectionView, IncidentView};
