use std::collections::BTreeMap;

use crate::scene::model::{BattleDataset, MovementKind, Troop, UnitKind};

/// Margins, in degrees of longitude, enforced by [`correct_layout`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum gap between a flank sub-unit and its army's centre.
    pub flank_margin: f64,
    /// Minimum gap between flank cavalry and the outermost infantry on that side.
    pub cavalry_margin: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            flank_margin: 0.002,
            cavalry_margin: 0.003,
        }
    }
}

/// Position of a sub-unit within its army's line.
///
/// Derived from free text: the lowercased id and display name are searched for `center`
/// (or `centre`), then `left`, then `right`; the first hit wins. Units matching none have no
/// role and are never moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlankRole {
    /// West wing.
    Left,
    /// Centre of the line.
    Center,
    /// East wing.
    Right,
}

impl FlankRole {
    /// Role of `troop`, if its id or name names one.
    pub fn classify(troop: &Troop) -> Option<Self> {
        let hay = format!("{} {}", troop.id, troop.name).to_ascii_lowercase();
        if hay.contains("center") || hay.contains("centre") {
            Some(Self::Center)
        } else if hay.contains("left") {
            Some(Self::Left)
        } else if hay.contains("right") {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// West is negative longitude.
    fn outward(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Center => 0.0,
        }
    }
}

/// What [`correct_layout`] changed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct LayoutReport {
    /// Adjustments in application order.
    pub adjustments: Vec<LayoutAdjustment>,
}

/// One corrective nudge applied to a troop snapshot.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayoutAdjustment {
    /// Declared id of the scene.
    pub scene_id: u32,
    /// Troop that moved.
    pub troop_id: String,
    /// Rule that required the move.
    pub rule: LayoutRule,
    /// Longitude shift applied to the position.
    pub position_shift: f64,
    /// Longitude shift applied to the movement destination.
    pub destination_shift: f64,
}

/// Layout correction rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutRule {
    /// Left and right sub-units kept outside the centre.
    FlankOrder,
    /// Flank cavalry kept outside the infantry on its side.
    CavalryOutside,
}

/// Enforce left/centre/right ordering and cavalry-outside-infantry per scene and army.
///
/// One corrective pass per rule, no iteration to a fixed point. The result is deterministic but
/// not guaranteed free of overlaps.
#[tracing::instrument(skip_all)]
pub fn correct_layout(dataset: &mut BattleDataset, config: &LayoutConfig) -> LayoutReport {
    let mut report = LayoutReport::default();

    for scene in &mut dataset.scenes {
        let scene_id = scene.id;
        let Some(troops) = scene.troops.as_mut() else {
            continue;
        };

        let mut by_side: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (i, t) in troops.iter().enumerate() {
            by_side.entry(t.side.clone()).or_default().push(i);
        }

        for group in by_side.values() {
            enforce_flank_order(troops, group, config.flank_margin, scene_id, &mut report);
            enforce_cavalry_outside(troops, group, config.cavalry_margin, scene_id, &mut report);
        }
    }

    if !report.adjustments.is_empty() {
        tracing::debug!(count = report.adjustments.len(), "layout corrections applied");
    }
    report
}

fn enforce_flank_order(
    troops: &mut [Troop],
    group: &[usize],
    margin: f64,
    scene_id: u32,
    report: &mut LayoutReport,
) {
    let centers: Vec<usize> = group
        .iter()
        .copied()
        .filter(|&i| FlankRole::classify(&troops[i]) == Some(FlankRole::Center))
        .collect();
    let Some(&center) = centers
        .iter()
        .find(|&&i| troops[i].kind == UnitKind::Infantry)
        .or_else(|| centers.first())
    else {
        return;
    };
    let anchor_pos = troops[center].position.lng;
    let anchor_dest = troops[center].movement.to.lng;

    for &i in group {
        if i == center {
            continue;
        }
        let Some(role @ (FlankRole::Left | FlankRole::Right)) = FlankRole::classify(&troops[i])
        else {
            continue;
        };
        let shift = |lng: f64, anchor: f64| {
            let violates = match role {
                FlankRole::Left => lng >= anchor,
                _ => lng <= anchor,
            };
            violates.then(|| role.outward() * ((lng - anchor).abs() + margin))
        };
        apply_shift(
            &mut troops[i],
            |lng| shift(lng, anchor_pos),
            |lng| shift(lng, anchor_dest),
            LayoutRule::FlankOrder,
            scene_id,
            report,
        );
    }
}

fn enforce_cavalry_outside(
    troops: &mut [Troop],
    group: &[usize],
    margin: f64,
    scene_id: u32,
    report: &mut LayoutReport,
) {
    let infantry: Vec<usize> = group
        .iter()
        .copied()
        .filter(|&i| troops[i].kind == UnitKind::Infantry)
        .collect();
    if infantry.is_empty() {
        return;
    }
    let fold = |f: fn(f64, f64) -> f64, init: f64, get: fn(&Troop) -> f64| {
        infantry.iter().map(|&i| get(&troops[i])).fold(init, f)
    };
    let west_pos = fold(f64::min, f64::INFINITY, |t| t.position.lng);
    let east_pos = fold(f64::max, f64::NEG_INFINITY, |t| t.position.lng);
    let west_dest = fold(f64::min, f64::INFINITY, |t| t.movement.to.lng);
    let east_dest = fold(f64::max, f64::NEG_INFINITY, |t| t.movement.to.lng);

    for &i in group {
        if troops[i].kind != UnitKind::Cavalry {
            continue;
        }
        let (pos_edge, dest_edge, role) = match FlankRole::classify(&troops[i]) {
            Some(FlankRole::Left) => (west_pos, west_dest, FlankRole::Left),
            Some(FlankRole::Right) => (east_pos, east_dest, FlankRole::Right),
            _ => continue,
        };
        let shift = |lng: f64, edge: f64| {
            let limit = edge + role.outward() * margin;
            let violates = match role {
                FlankRole::Left => lng > limit,
                _ => lng < limit,
            };
            violates.then(|| limit - lng)
        };
        apply_shift(
            &mut troops[i],
            |lng| shift(lng, pos_edge),
            |lng| shift(lng, dest_edge),
            LayoutRule::CavalryOutside,
            scene_id,
            report,
        );
    }
}

/// Shift a troop's position and destination longitude.
///
/// A static troop's destination follows the position shift; a moving troop's destination is
/// checked against its own anchor.
fn apply_shift(
    troop: &mut Troop,
    position_rule: impl Fn(f64) -> Option<f64>,
    destination_rule: impl Fn(f64) -> Option<f64>,
    rule: LayoutRule,
    scene_id: u32,
    report: &mut LayoutReport,
) {
    let position_shift = position_rule(troop.position.lng).unwrap_or(0.0);
    let destination_shift = if troop.movement.kind == MovementKind::Static {
        position_shift
    } else {
        destination_rule(troop.movement.to.lng).unwrap_or(0.0)
    };
    if position_shift == 0.0 && destination_shift == 0.0 {
        return;
    }

    troop.position.lng += position_shift;
    troop.movement.to.lng += destination_shift;
    report.adjustments.push(LayoutAdjustment {
        scene_id,
        troop_id: troop.id.clone(),
        rule,
        position_shift,
        destination_shift,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/layout.rs"]
mod tests;
