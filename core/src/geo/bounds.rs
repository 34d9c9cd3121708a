use crate::random::{uniform_range, RandomSource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Builds bounds from two opposite corners given in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lng.min(b.lng),
            north: a.lat.max(b.lat),
            east: a.lng.max(b.lng),
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    /// True when either span is below `epsilon_deg`, i.e. the drag was an accidental click.
    pub fn is_tiny(&self, epsilon_deg: f64) -> bool {
        self.lat_span() < epsilon_deg || self.lng_span() < epsilon_deg
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }

    /// Independent uniform draws on latitude then longitude.
    ///
    /// Not area-uniform on the sphere; at the scale of a drawn selection the
    /// difference is irrelevant.
    pub fn sample_point<R: RandomSource + ?Sized>(&self, rng: &mut R) -> LatLng {
        let lat = uniform_range(rng, self.south, self.north);
        let lng = uniform_range(rng, self.west, self.east);
        LatLng::new(lat, lng)
    }
}
