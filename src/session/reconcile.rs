use std::collections::HashSet;

use crate::{
    foundation::{
        core::{GeoPoint, facing_angle_deg},
        error::{BattleError, BattleResult},
    },
    scene::model::{BattleDataset, DeclaredStatus, Movement, MovementKind, Troop, TroopStatus},
    session::store::UnitStateStore,
};

/// Where a plan entry's troop snapshot came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    /// Listed in the scene being rendered.
    Declared,
    /// Missing from the scene but still active in the store; held in place.
    Carried,
}

/// Render instructions for one unit in one scene transition.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PlanEntry {
    /// Snapshot to render; synthesized as static for carried units.
    pub troop: Troop,
    /// Whether the scene listed the unit.
    pub origin: EntryOrigin,
    /// Position the marker is drawn at.
    pub start_position: GeoPoint,
    /// Position the marker settles at.
    pub end_position: GeoPoint,
    /// Facing when drawn, in degrees.
    pub start_angle: f64,
    /// Facing when settled, in degrees.
    pub end_angle: f64,
    /// Status carried in from the previous render.
    pub start_status: TroopStatus,
    /// Already routed or defeated in an earlier scene; not rendered at all.
    pub suppressed: bool,
}

impl PlanEntry {
    /// Status the unit animates towards in this scene.
    pub fn status(&self) -> TroopStatus {
        self.troop.status()
    }

    /// See [`Troop::is_moving`].
    pub fn is_moving(&self) -> bool {
        self.troop.is_moving()
    }
}

/// Everything the director needs to play one scene.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ScenePlan {
    /// Index of the scene.
    pub scene_index: usize,
    /// Declared scene id.
    pub scene_id: u32,
    /// Declared units in scene order, then carried units.
    pub entries: Vec<PlanEntry>,
}

impl ScenePlan {
    /// Entries that get drawn.
    pub fn renderable(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| !e.suppressed)
    }

    /// Entries left out because the unit already exited the battle.
    pub fn suppressed(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.suppressed)
    }

    /// Entry for `unit_id`.
    pub fn entry(&self, unit_id: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|e| e.troop.id == unit_id)
    }
}

/// Compute the render plan for scene `scene_index` from the dataset and the carried-over state.
///
/// Scene 0 is an initial deployment: declared positions are used verbatim and the store is not
/// consulted. Later scenes start each unit from its stored position and facing, suppress units
/// that left the battle in an earlier scene, and hold active units the snapshot forgot to list.
#[tracing::instrument(skip(dataset, store))]
pub fn reconcile(
    dataset: &BattleDataset,
    scene_index: usize,
    store: &UnitStateStore,
    default_facing_deg: f64,
) -> BattleResult<ScenePlan> {
    let scene = dataset
        .scene(scene_index)
        .ok_or(BattleError::SceneIndexOutOfRange {
            index: scene_index,
            count: dataset.scene_count(),
        })?;

    let mut entries = Vec::with_capacity(scene.troops().len());
    for troop in scene.troops() {
        let prior = if scene_index == 0 {
            None
        } else {
            store.get(&troop.id)
        };
        let suppressed = prior.is_some_and(|p| {
            p.last_seen_in_scene < scene_index && p.status.is_out_of_battle()
        });
        let start_position = prior.map_or(troop.position, |p| p.position);
        let start_angle = prior.map_or(default_facing_deg, |p| p.facing_deg);
        let status = troop.status();
        let end_position = end_position(troop, status, start_position);

        entries.push(PlanEntry {
            troop: troop.clone(),
            origin: EntryOrigin::Declared,
            start_position,
            end_position,
            start_angle,
            end_angle: end_angle(start_position, end_position, start_angle),
            start_status: status,
            suppressed,
        });
    }

    if scene_index > 0 {
        let present: HashSet<&str> = scene.troops().iter().map(|t| t.id.as_str()).collect();
        let sides: HashSet<&str> = scene.troops().iter().map(|t| t.side.as_str()).collect();

        for (id, state) in store.iter() {
            // Held units must have been rendered in an earlier scene.
            if present.contains(id)
                || state.status != TroopStatus::Active
                || state.last_seen_in_scene >= scene_index
            {
                continue;
            }
            let Some(snapshot) = latest_snapshot(dataset, id, state.last_seen_in_scene) else {
                continue;
            };
            // An army with nobody left in the scene has been eliminated.
            if !sides.contains(snapshot.side.as_str()) {
                continue;
            }
            tracing::debug!(unit = id, scene_index, "holding unit missing from scene");

            let mut troop = snapshot.clone();
            troop.status = DeclaredStatus::Known(state.status);
            troop.position = state.position;
            troop.movement = Movement {
                to: state.position,
                kind: MovementKind::Static,
            };
            entries.push(PlanEntry {
                troop,
                origin: EntryOrigin::Carried,
                start_position: state.position,
                end_position: state.position,
                start_angle: state.facing_deg,
                end_angle: state.facing_deg,
                start_status: state.status,
                suppressed: false,
            });
        }
    }

    Ok(ScenePlan {
        scene_index,
        scene_id: scene.id,
        entries,
    })
}

fn end_position(troop: &Troop, status: TroopStatus, start: GeoPoint) -> GeoPoint {
    match status {
        TroopStatus::Defeated => start,
        TroopStatus::Active | TroopStatus::Routed if troop.is_moving() => troop.movement.to,
        TroopStatus::Active | TroopStatus::Routed => start,
    }
}

/// Facing follows actual displacement only; a unit that does not move keeps its angle.
fn end_angle(start: GeoPoint, end: GeoPoint, start_angle: f64) -> f64 {
    if start == end {
        start_angle
    } else {
        facing_angle_deg(start, end)
    }
}

fn latest_snapshot<'a>(dataset: &'a BattleDataset, id: &str, from_index: usize) -> Option<&'a Troop> {
    let last = from_index.min(dataset.scene_count().checked_sub(1)?);
    dataset.scenes[..=last]
        .iter()
        .rev()
        .find_map(|s| s.troop(id))
}

#[cfg(test)]
#[path = "../../tests/unit/session/reconcile.rs"]
mod tests;
