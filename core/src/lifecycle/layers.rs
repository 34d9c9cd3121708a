use crate::geo::{GeoBounds, LatLng};
use crate::impact::RiskTier;
use crate::lifecycle::event::Effect;
use crate::lifecycle::marker::{MarkerId, MarkerStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub id: MarkerId,
    pub location: LatLng,
    pub style: MarkerStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactCircle {
    pub marker: MarkerId,
    pub center: LatLng,
    pub radius_m: u32,
    pub tier: RiskTier,
}

/// What is currently drawn on the map, rebuilt purely from the effect stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapLayers {
    pub selection: Option<GeoBounds>,
    pub markers: Vec<MapMarker>,
    pub circles: Vec<ImpactCircle>,
}

impl MapLayers {
    pub fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::DrawSelection { bounds } => self.selection = Some(*bounds),
            Effect::ClearSelection => self.selection = None,
            Effect::PlaceMarker {
                marker,
                location,
                style,
            } => {
                self.markers.retain(|existing| existing.id != *marker);
                self.markers.push(MapMarker {
                    id: *marker,
                    location: *location,
                    style: *style,
                });
            }
            Effect::RestyleMarker { marker, style } => {
                if let Some(existing) = self.markers.iter_mut().find(|m| m.id == *marker) {
                    existing.style = *style;
                }
            }
            Effect::RemoveMarker { marker } => {
                self.markers.retain(|existing| existing.id != *marker);
                self.circles.retain(|circle| circle.marker != *marker);
            }
            Effect::DrawImpact {
                marker,
                center,
                radius_m,
                tier,
            } => {
                self.circles.retain(|circle| circle.marker != *marker);
                self.circles.push(ImpactCircle {
                    marker: *marker,
                    center: *center,
                    radius_m: *radius_m,
                    tier: *tier,
                });
            }
            Effect::RemoveImpact { marker } => {
                self.circles.retain(|circle| circle.marker != *marker);
            }
            Effect::ScheduleAnalysis { .. }
            | Effect::SetRunEnabled { .. }
            | Effect::FocusIncident { .. }
            | Effect::Notify { .. } => {}
        }
    }

    pub fn apply_all<'a>(&mut self, effects: impl IntoIterator<Item = &'a Effect>) {
        for effect in effects {
            self.apply(effect);
        }
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MapMarker> {
        self.markers.iter().find(|marker| marker.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removing_marker_drops_its_circle() {
        let mut layers = MapLayers::default();
        let center = LatLng::new(38.1, 23.7);
        layers.apply_all(&[
            Effect::PlaceMarker {
                marker: MarkerId(1),
                location: center,
                style: MarkerStyle::Unconfirmed,
            },
            Effect::DrawImpact {
                marker: MarkerId(1),
                center,
                radius_m: 900,
                tier: RiskTier::Low,
            },
        ]);
        assert_eq!(layers.circles.len(), 1);

        layers.apply(&Effect::RemoveMarker {
            marker: MarkerId(1),
        });
        assert!(layers.markers.is_empty());
        assert!(layers.circles.is_empty());
    }

    #[test]
    fn restyle_updates_existing_marker_only() {
        let mut layers = MapLayers::default();
        layers.apply(&Effect::PlaceMarker {
            marker: MarkerId(4),
            location: LatLng::new(0.0, 0.0),
            style: MarkerStyle::Unconfirmed,
        });
        layers.apply(&Effect::RestyleMarker {
            marker: MarkerId(4),
            style: MarkerStyle::Resolved,
        });
        layers.apply(&Effect::RestyleMarker {
            marker: MarkerId(9),
            style: MarkerStyle::Resolved,
        });
        assert_eq!(layers.markers.len(), 1);
        assert_eq!(
            layers.marker(MarkerId(4)).map(|m| m.style),
            Some(MarkerStyle::Resolved)
        );
    }
}
