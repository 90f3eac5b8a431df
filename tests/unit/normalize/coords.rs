use super::*;
use crate::foundation::core::GeoBounds;

const CANNAE: &str = include_str!("../../data/cannae.json");
const EPS: f64 = 1e-9;

fn cannae() -> BattleDataset {
    BattleDataset::from_json(CANNAE).unwrap()
}

fn all_points(ds: &BattleDataset) -> Vec<GeoPoint> {
    ds.scenes
        .iter()
        .flat_map(|s| s.troops())
        .flat_map(|t| [t.position, t.movement.to])
        .collect()
}

#[test]
fn target_spread_scales_with_troop_count_and_clamps() {
    let cfg = NormalizeConfig::default();
    assert!((cfg.target_spread(10) - 0.008).abs() < EPS);
    assert!((cfg.target_spread(40) - 0.016).abs() < EPS);
    assert_eq!(cfg.target_spread(1000), cfg.max_spread);
    assert_eq!(cfg.target_spread(1), cfg.min_spread);
}

#[test]
fn rescales_both_axes_to_target_spread() {
    let mut ds = cannae();
    let report = normalize_coordinates(&mut ds, &NormalizeConfig::default()).unwrap();
    let b = GeoBounds::from_points(all_points(&ds)).unwrap();
    assert!((b.lat_span() - report.target_spread).abs() < EPS);
    assert!((b.lng_span() - report.target_spread).abs() < EPS);
    assert!(b.center().approx_eq(report.before.center(), EPS));
    assert!((report.after.lat_span() - b.lat_span()).abs() < EPS);
}

#[test]
fn normalizing_twice_is_idempotent() {
    let cfg = NormalizeConfig::default();
    let mut once = cannae();
    normalize_coordinates(&mut once, &cfg).unwrap();
    let mut twice = once.clone();
    let second = normalize_coordinates(&mut twice, &cfg).unwrap();

    assert!((second.scale_lat - 1.0).abs() < 1e-6);
    assert!((second.scale_lng - 1.0).abs() < 1e-6);
    for (a, b) in all_points(&once).into_iter().zip(all_points(&twice)) {
        assert!(a.approx_eq(b, 1e-12), "{a:?} != {b:?}");
    }
}

#[test]
fn relative_layout_is_preserved() {
    let original = cannae();
    let mut ds = original.clone();
    let report = normalize_coordinates(&mut ds, &NormalizeConfig::default()).unwrap();

    let c0 = report.before.center();
    for (raw, scaled) in all_points(&original).into_iter().zip(all_points(&ds)) {
        let expect_lat = c0.lat + (raw.lat - c0.lat) * report.scale_lat;
        let expect_lng = c0.lng + (raw.lng - c0.lng) * report.scale_lng;
        assert!(scaled.approx_eq(GeoPoint::new(expect_lat, expect_lng), EPS));
    }

    // West-to-east ordering survives.
    let s1 = ds.scene(0).unwrap();
    let left = s1.troop("roman_cav_left").unwrap().position.lng;
    let center = s1.troop("roman_inf_center").unwrap().position.lng;
    let right = s1.troop("roman_cav_right").unwrap().position.lng;
    assert!(left < center && center < right);
}

#[test]
fn degenerate_axis_is_left_in_place() {
    let mut ds = cannae();
    for t in ds.troops_mut() {
        t.position.lat = 41.3;
        t.movement.to.lat = 41.3;
    }
    let report = normalize_coordinates(&mut ds, &NormalizeConfig::default()).unwrap();
    assert!(report.scale_lat.is_finite());
    assert!(all_points(&ds).iter().all(|p| p.lat == 41.3));
}

#[test]
fn dataset_without_troops_is_untouched() {
    let mut ds = BattleDataset::default();
    assert!(normalize_coordinates(&mut ds, &NormalizeConfig::default()).is_none());
}
