//! Detection and incident lifecycle core for the wildfire operator console.
//!
//! An operator selects an area, a simulated analysis yields a candidate
//! detection, and the operator confirms or rejects it. Confirmed detections
//! become incidents with an illustrative impact estimate and an
//! operator-managed status. The crate has no I/O: drivers feed
//! [`lifecycle::ConsoleEvent`]s in and apply the returned effects.

pub mod clock;
pub mod export;
pub mod geo;
pub mod impact;
pub mod lifecycle;
pub mod prelude;
pub mod random;
pub mod telemetry;

pub use lifecycle::{ConsoleEvent, Effect, FireConsole};
pub use prelude::{ConsoleError, ConsoleResult, ConsoleSettings};
