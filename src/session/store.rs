use std::collections::BTreeMap;

use crate::{foundation::core::GeoPoint, scene::model::TroopStatus};

/// Last rendered state of one unit, carried from one scene transition to the next.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct UnitVisualState {
    /// Where the unit settled.
    pub position: GeoPoint,
    /// Status it settled in.
    pub status: TroopStatus,
    /// Index (not id) of the scene in which the unit was last rendered.
    pub last_seen_in_scene: usize,
    /// Facing in degrees, clockwise from north.
    pub facing_deg: f64,
}

/// Per-session map from unit id to [`UnitVisualState`].
///
/// Only the animation director writes to it (after a transition settles) and only the
/// reconciler reads it (when a transition starts). Iteration is ordered by unit id.
#[derive(Clone, Debug, Default)]
pub struct UnitStateStore {
    units: BTreeMap<String, UnitVisualState>,
}

impl UnitStateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of `unit_id`, if it has been rendered.
    pub fn get(&self, unit_id: &str) -> Option<&UnitVisualState> {
        self.units.get(unit_id)
    }

    /// Record the settled state of a unit, replacing any earlier one.
    pub fn set(&mut self, unit_id: impl Into<String>, state: UnitVisualState) {
        self.units.insert(unit_id.into(), state);
    }

    /// Forget every unit. Called when the viewer returns to scene 0 or loads a new battle.
    pub fn reset_all(&mut self) {
        self.units.clear();
    }

    /// Number of tracked units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// `true` when no unit is tracked.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Tracked units in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitVisualState)> {
        self.units.iter().map(|(id, s)| (id.as_str(), s))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/store.rs"]
mod tests;
