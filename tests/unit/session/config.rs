use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = EngineConfig::from_json("{}").unwrap();
    assert_eq!(cfg, EngineConfig::default());
    assert_eq!(cfg.director.unit_move_ms, 1500);
    assert_eq!(cfg.normalize.reference_count, 10);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let cfg = EngineConfig::from_json(
        r#"{ "director": { "unit_move_ms": 10, "unit_ease": "out_quad" }, "default_facing_deg": 45 }"#,
    )
    .unwrap();
    assert_eq!(cfg.director.unit_move_ms, 10);
    assert_eq!(cfg.director.unit_ease, Ease::OutQuad);
    assert_eq!(cfg.director.arrow_fade_ms, 300);
    assert_eq!(cfg.default_facing_deg, 45.0);
    assert_eq!(cfg.layout, LayoutConfig::default());
}

#[test]
fn malformed_config_is_a_serde_error() {
    let err = EngineConfig::from_json("{ \"director\": 3 }").unwrap_err();
    assert!(matches!(err, BattleError::Serde(_)));
}

#[test]
fn unit_radius_scales_with_sqrt_of_size_and_clamps() {
    let cfg = DirectorConfig::default();
    assert!((cfg.unit_radius(4000) - 10.0).abs() < 1e-12);
    assert_eq!(cfg.unit_radius(0), cfg.min_unit_radius);
    assert_eq!(cfg.unit_radius(1_000_000), cfg.max_unit_radius);
}

fn rejected(json: &str, needle: &str) {
    match EngineConfig::from_json(json) {
        Err(BattleError::Validation(msg)) => {
            assert!(msg.contains(needle), "{msg:?} does not mention {needle:?}")
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn inverted_unit_radius_range_is_rejected() {
    rejected(
        r#"{ "director": { "min_unit_radius": 50.0, "max_unit_radius": 40.0 } }"#,
        "min_unit_radius",
    );
}

#[test]
fn inverted_spread_range_is_rejected() {
    rejected(
        r#"{ "normalize": { "min_spread": 0.02, "max_spread": 0.01 } }"#,
        "min_spread",
    );
}

#[test]
fn zero_reference_count_is_rejected() {
    rejected(
        r#"{ "normalize": { "reference_count": 0 } }"#,
        "reference_count",
    );
}

#[test]
fn empty_viewport_is_rejected() {
    rejected(r#"{ "viewport": { "width": 0 } }"#, "viewport");
}

#[test]
fn non_finite_values_are_rejected() {
    let mut cfg = EngineConfig::default();
    cfg.director.max_unit_radius = f64::NAN;
    assert!(matches!(cfg.validate(), Err(BattleError::Validation(_))));

    let mut cfg = EngineConfig::default();
    cfg.normalize.base_spread = f64::INFINITY;
    assert!(matches!(cfg.validate(), Err(BattleError::Validation(_))));

    let mut cfg = EngineConfig::default();
    cfg.default_facing_deg = f64::NEG_INFINITY;
    assert!(matches!(cfg.validate(), Err(BattleError::Validation(_))));

    assert!(EngineConfig::default().validate().is_ok());
}

#[test]
fn unit_radius_never_panics_on_an_unchecked_range() {
    let cfg = DirectorConfig {
        min_unit_radius: 50.0,
        max_unit_radius: 40.0,
        ..DirectorConfig::default()
    };
    assert_eq!(cfg.unit_radius(1000), 40.0);
}
