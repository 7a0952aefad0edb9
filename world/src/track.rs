//! Active window of placed units along the generation axis.

use std::collections::VecDeque;
use std::time::Duration;

use crowd_runner_core::{DoorConfig, UnitDefinition, UnitId};

/// Trigger state of a placed door.
#[derive(Clone, Debug)]
pub(crate) struct DoorState {
    pub(crate) armed: bool,
    pub(crate) rearm_at: Option<Duration>,
}

impl DoorState {
    fn new() -> Self {
        Self {
            armed: true,
            rearm_at: None,
        }
    }
}

/// One materialized unit occupying an interval of the generation axis.
#[derive(Clone, Debug)]
pub(crate) struct PlacedUnit {
    pub(crate) id: UnitId,
    pub(crate) definition: UnitDefinition,
    pub(crate) start: f32,
    pub(crate) end: f32,
    pub(crate) door: Option<DoorState>,
}

impl PlacedUnit {
    pub(crate) fn door_config(&self) -> Option<&DoorConfig> {
        self.definition.door.as_ref()
    }
}

/// Streaming cursor and the ordered window of currently placed units.
///
/// Intervals are contiguous, non-overlapping, and ordered by offset; the
/// cursor never decreases while the window lives.
#[derive(Debug, Default)]
pub(crate) struct Track {
    units: VecDeque<PlacedUnit>,
    cursor: f32,
    next_unit: u32,
}

impl Track {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drops every placed unit and resets the cursor and id allocation.
    ///
    /// Pending door re-arm deadlines die with their units.
    pub(crate) fn clear(&mut self) {
        self.units.clear();
        self.cursor = 0.0;
        self.next_unit = 0;
    }

    /// Materializes the definition at the cursor and advances it.
    pub(crate) fn place(&mut self, definition: UnitDefinition) -> &PlacedUnit {
        let length = definition.clamped_length();
        let start = self.cursor;
        let end = start + length;
        let id = UnitId::new(self.next_unit);
        self.next_unit = self.next_unit.wrapping_add(1);

        let door = definition.door.as_ref().map(|_| DoorState::new());
        self.units.push_back(PlacedUnit {
            id,
            definition,
            start,
            end,
            door,
        });
        self.cursor = end;
        self.units.back().expect("unit was just placed")
    }

    /// Releases window-front units that ended before the cutoff.
    ///
    /// Units are released oldest first so offsets stay monotonic.
    pub(crate) fn release_behind(&mut self, cutoff: f32) -> Vec<UnitId> {
        let mut released = Vec::new();
        while let Some(front) = self.units.front() {
            if front.end >= cutoff {
                break;
            }
            let unit = self.units.pop_front().expect("front unit exists");
            released.push(unit.id);
        }
        released
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut PlacedUnit> {
        self.units.iter_mut().find(|unit| unit.id == id)
    }

    pub(crate) fn contains(&self, id: UnitId) -> bool {
        self.units.iter().any(|unit| unit.id == id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PlacedUnit> {
        self.units.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlacedUnit> {
        self.units.iter_mut()
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(crate) fn oldest_end(&self) -> Option<f32> {
        self.units.front().map(|unit| unit.end)
    }
}
