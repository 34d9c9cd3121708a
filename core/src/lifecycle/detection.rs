use crate::geo::{GeoBounds, LatLng};
use crate::lifecycle::marker::MarkerHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionState {
    Unconfirmed,
    Confirmed,
    Rejected,
}

/// Review phase. The marker lives inside `Pending`, so an unconfirmed
/// detection always owns one and a reviewed detection never does.
#[derive(Debug)]
enum Review {
    Pending(MarkerHandle),
    Confirmed { at: DateTime<Utc> },
    Rejected,
}

/// Candidate event awaiting operator review.
#[derive(Debug)]
pub struct Detection {
    id: String,
    bounds: GeoBounds,
    location: LatLng,
    confidence_pct: u8,
    detected_at: DateTime<Utc>,
    operator_note: String,
    review: Review,
}

impl Detection {
    pub(crate) fn new(
        id: String,
        bounds: GeoBounds,
        location: LatLng,
        confidence_pct: u8,
        detected_at: DateTime<Utc>,
        marker: MarkerHandle,
    ) -> Self {
        Self {
            id,
            bounds,
            location,
            confidence_pct,
            detected_at,
            operator_note: String::new(),
            review: Review::Pending(marker),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn location(&self) -> LatLng {
        self.location
    }

    pub fn confidence_pct(&self) -> u8 {
        self.confidence_pct
    }

    pub fn detected_at(&self) -> DateTime<Utc> {
        self.detected_at
    }

    pub fn state(&self) -> DetectionState {
        match self.review {
            Review::Pending(_) => DetectionState::Unconfirmed,
            Review::Confirmed { .. } => DetectionState::Confirmed,
            Review::Rejected => DetectionState::Rejected,
        }
    }

    pub fn confirmed_at(&self) -> Option<DateTime<Utc>> {
        match self.review {
            Review::Confirmed { at } => Some(at),
            _ => None,
        }
    }

    pub fn operator_note(&self) -> &str {
        &self.operator_note
    }

    pub fn marker(&self) -> Option<&MarkerHandle> {
        match &self.review {
            Review::Pending(marker) => Some(marker),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.review, Review::Pending(_))
    }

    pub(crate) fn set_operator_note(&mut self, note: String) {
        self.operator_note = note;
    }

    /// Moves a pending detection to `Confirmed` and releases its marker.
    /// Returns `None` and changes nothing once the detection was reviewed.
    pub(crate) fn mark_confirmed(&mut self, at: DateTime<Utc>) -> Option<MarkerHandle> {
        self.finish_review(Review::Confirmed { at })
    }

    /// Moves a pending detection to `Rejected`; the returned marker is meant to be dropped.
    pub(crate) fn mark_rejected(&mut self) -> Option<MarkerHandle> {
        self.finish_review(Review::Rejected)
    }

    /// Retires the detection, handing back the marker if it was still pending.
    pub(crate) fn into_marker(self) -> Option<MarkerHandle> {
        match self.review {
            Review::Pending(marker) => Some(marker),
            _ => None,
        }
    }

    fn finish_review(&mut self, outcome: Review) -> Option<MarkerHandle> {
        if !self.is_pending() {
            return None;
        }
        match std::mem::replace(&mut self.review, outcome) {
            Review::Pending(marker) => Some(marker),
            _ => None,
        }
    }
}
