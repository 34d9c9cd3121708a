use serde::{Deserialize, Serialize};

/// Identifier of a drawn map marker, as referenced by effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

/// Owning token for one map marker.
///
/// Deliberately not `Clone`: exactly one record (a live detection or an
/// incident) holds a marker at any time, and handing it over is a move.
#[derive(Debug, PartialEq, Eq)]
pub struct MarkerHandle {
    id: MarkerId,
}

impl MarkerHandle {
    pub fn id(&self) -> MarkerId {
        self.id
    }
}

#[derive(Debug, Default)]
pub struct MarkerAllocator {
    next: u64,
}

impl MarkerAllocator {
    pub fn allocate(&mut self) -> MarkerHandle {
        self.next += 1;
        MarkerHandle {
            id: MarkerId(self.next),
        }
    }
}

/// Visual class of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    Unconfirmed,
    AwaitingResponse,
    ResponseDispatched,
    Resolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_hands_out_distinct_ids() {
        let mut allocator = MarkerAllocator::default();
        let first = allocator.allocate();
        let second = allocator.allocate();
        assert_ne!(first.id(), second.id());
    }
}
