use super::*;
use crate::foundation::core::GeoPoint;
use crate::scene::model::{DeclaredStatus, Movement, Scene, TroopStatus};

const EPS: f64 = 1e-12;

fn troop(id: &str, side: &str, kind: UnitKind, lng: f64, to_lng: f64) -> Troop {
    let movement = if lng == to_lng {
        MovementKind::Static
    } else {
        MovementKind::Advance
    };
    Troop {
        id: id.to_string(),
        side: side.to_string(),
        kind,
        name: String::new(),
        size: 1000,
        status: DeclaredStatus::Known(TroopStatus::Active),
        position: GeoPoint::new(41.3, lng),
        movement: Movement {
            to: GeoPoint::new(41.3, to_lng),
            kind: movement,
        },
    }
}

fn one_scene(troops: Vec<Troop>) -> BattleDataset {
    BattleDataset {
        scenes: vec![Scene {
            id: 1,
            troops: Some(troops),
            ..Scene::default()
        }],
        ..BattleDataset::default()
    }
}

fn lng(ds: &BattleDataset, id: &str) -> (f64, f64) {
    let t = ds.scenes[0].troop(id).unwrap();
    (t.position.lng, t.movement.to.lng)
}

#[test]
fn classify_prefers_center_then_left_then_right() {
    let mut t = troop("roman_inf_center", "r", UnitKind::Infantry, 0.0, 0.0);
    assert_eq!(FlankRole::classify(&t), Some(FlankRole::Center));
    t.id = "x".into();
    t.name = "Left Wing".into();
    assert_eq!(FlankRole::classify(&t), Some(FlankRole::Left));
    t.name = "Allied Cavalry (Right)".into();
    assert_eq!(FlankRole::classify(&t), Some(FlankRole::Right));
    t.name = "Centre left".into();
    assert_eq!(FlankRole::classify(&t), Some(FlankRole::Center));
    t.name = "Reserve".into();
    assert_eq!(FlankRole::classify(&t), None);
}

#[test]
fn left_unit_east_of_center_is_moved_west_past_margin() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.130),
        troop("a_inf_left", "a", UnitKind::Infantry, 16.131, 16.131),
    ]);
    let report = correct_layout(&mut ds, &LayoutConfig::default());

    let (pos, dest) = lng(&ds, "a_inf_left");
    assert!((pos - (16.130 - 0.002)).abs() < EPS, "pos {pos}");
    assert_eq!(pos, dest, "static destination follows the position");
    assert_eq!(report.adjustments.len(), 1);
    assert_eq!(report.adjustments[0].rule, LayoutRule::FlankOrder);
}

#[test]
fn right_unit_on_center_line_is_moved_east() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.130),
        troop("a_inf_right", "a", UnitKind::Infantry, 16.130, 16.130),
    ]);
    correct_layout(&mut ds, &LayoutConfig::default());
    let (pos, _) = lng(&ds, "a_inf_right");
    assert!((pos - 16.132).abs() < EPS);
}

#[test]
fn moving_destination_is_checked_independently() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.140),
        // Position is fine (west of centre) but it ends east of the centre's destination.
        troop("a_inf_left", "a", UnitKind::Infantry, 16.120, 16.145),
    ]);
    correct_layout(&mut ds, &LayoutConfig::default());
    let (pos, dest) = lng(&ds, "a_inf_left");
    assert_eq!(pos, 16.120);
    assert!((dest - (16.140 - 0.002)).abs() < EPS, "dest {dest}");
}

#[test]
fn correctly_ordered_units_are_untouched() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.130),
        troop("a_inf_left", "a", UnitKind::Infantry, 16.125, 16.125),
        troop("a_inf_right", "a", UnitKind::Infantry, 16.135, 16.135),
        troop("a_cav_left", "a", UnitKind::Cavalry, 16.120, 16.120),
        troop("a_cav_right", "a", UnitKind::Cavalry, 16.140, 16.140),
    ]);
    let report = correct_layout(&mut ds, &LayoutConfig::default());
    assert!(report.adjustments.is_empty());
}

#[test]
fn cavalry_is_pushed_outside_outermost_infantry() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.130),
        troop("a_inf_right", "a", UnitKind::Infantry, 16.134, 16.134),
        troop("a_cav_right", "a", UnitKind::Cavalry, 16.135, 16.135),
        troop("a_cav_left", "a", UnitKind::Cavalry, 16.129, 16.129),
    ]);
    correct_layout(&mut ds, &LayoutConfig::default());

    let (right, _) = lng(&ds, "a_cav_right");
    assert!((right - (16.134 + 0.003)).abs() < EPS, "right {right}");
    let (left, _) = lng(&ds, "a_cav_left");
    assert!((left - (16.130 - 0.003)).abs() < EPS, "left {left}");
}

#[test]
fn armies_are_corrected_independently() {
    let mut ds = one_scene(vec![
        troop("a_center", "a", UnitKind::Infantry, 16.130, 16.130),
        troop("b_center", "b", UnitKind::Infantry, 16.100, 16.100),
        troop("b_inf_left", "b", UnitKind::Infantry, 16.110, 16.110),
    ]);
    correct_layout(&mut ds, &LayoutConfig::default());
    let (b_left, _) = lng(&ds, "b_inf_left");
    assert!((b_left - 16.098).abs() < EPS);
    assert_eq!(lng(&ds, "a_center").0, 16.130);
}

#[test]
fn gaps_never_end_below_margin_on_fixture() {
    let cfg = LayoutConfig::default();
    let mut ds = BattleDataset::from_json(include_str!("../../data/cannae.json")).unwrap();
    crate::normalize::coords::normalize_coordinates(&mut ds, &Default::default());
    correct_layout(&mut ds, &cfg);

    for scene in &ds.scenes {
        let mut sides: BTreeMap<&str, Vec<&Troop>> = BTreeMap::new();
        for t in scene.troops() {
            sides.entry(t.side.as_str()).or_default().push(t);
        }
        for group in sides.values() {
            let infantry: Vec<f64> = group
                .iter()
                .filter(|t| t.kind == UnitKind::Infantry)
                .map(|t| t.position.lng)
                .collect();
            let Some(west) = infantry.iter().copied().reduce(f64::min) else {
                continue;
            };
            let east = infantry.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for t in group.iter().filter(|t| t.kind == UnitKind::Cavalry) {
                match FlankRole::classify(t) {
                    Some(FlankRole::Left) => {
                        assert!(west - t.position.lng >= cfg.cavalry_margin - EPS, "{}", t.id)
                    }
                    Some(FlankRole::Right) => {
                        assert!(t.position.lng - east >= cfg.cavalry_margin - EPS, "{}", t.id)
                    }
                    _ => {}
                }
            }
        }
    }
}

#[test]
fn correction_is_deterministic() {
    let run = || {
        let mut ds = BattleDataset::from_json(include_str!("../../data/cannae.json")).unwrap();
        correct_layout(&mut ds, &LayoutConfig::default())
    };
    assert_eq!(run(), run());
}
