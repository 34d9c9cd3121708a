pub mod area;
pub mod bounds;

pub use area::{round_to, AreaHelper};
pub use bounds::{GeoBounds, LatLng};
