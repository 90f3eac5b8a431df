use super::*;

const CANNAE: &str = include_str!("../../data/cannae.json");

fn troop_json(status: &str) -> String {
    format!(
        r#"{{"id":"t1","side":"a","type":"Cavalry","size":10,{status}
            "position":{{"lat":1.0,"lng":2.0}},
            "movement":{{"to":{{"lat":1.0,"lng":2.5}},"type":"flank"}}}}"#
    )
}

#[test]
fn cannae_fixture_parses() {
    let ds = BattleDataset::from_json(CANNAE).unwrap();
    assert_eq!(ds.scene_count(), 3);
    assert_eq!(ds.army("roman").unwrap().color.as_deref(), Some("#e63946"));
    let s2 = ds.scene(1).unwrap();
    let cav = s2.troop("roman_cav_left").unwrap();
    assert_eq!(cav.kind, UnitKind::Cavalry);
    assert_eq!(cav.status(), TroopStatus::Routed);
    assert_eq!(cav.movement.kind, MovementKind::Retreat);
    assert!(cav.is_moving());
}

#[test]
fn status_field_keeps_missing_and_invalid_apart() {
    let missing: Troop = serde_json::from_str(&troop_json("")).unwrap();
    assert_eq!(missing.status, DeclaredStatus::Missing);
    assert_eq!(missing.status(), TroopStatus::Active);

    let null: Troop = serde_json::from_str(&troop_json(r#""status":null,"#)).unwrap();
    assert_eq!(null.status, DeclaredStatus::Missing);

    let bogus: Troop = serde_json::from_str(&troop_json(r#""status":"fleeing","#)).unwrap();
    assert_eq!(bogus.status, DeclaredStatus::Invalid("fleeing".to_string()));
    assert_eq!(bogus.status(), TroopStatus::Active);

    let numeric: Troop = serde_json::from_str(&troop_json(r#""status":3,"#)).unwrap();
    assert_eq!(numeric.status, DeclaredStatus::Invalid("3".to_string()));

    let upper: Troop = serde_json::from_str(&troop_json(r#""status":"Defeated","#)).unwrap();
    assert_eq!(upper.status(), TroopStatus::Defeated);
}

#[test]
fn unit_kind_is_case_insensitive_with_fallback() {
    assert_eq!(UnitKind::from("Infantry".to_string()), UnitKind::Infantry);
    assert_eq!(UnitKind::from(" horse ".to_string()), UnitKind::Cavalry);
    assert_eq!(UnitKind::from("fleet".to_string()), UnitKind::Naval);
    assert_eq!(
        UnitKind::from("war elephants".to_string()),
        UnitKind::Other("war elephants".to_string())
    );
    assert_eq!(String::from(UnitKind::Artillery), "artillery");
}

#[test]
fn display_name_falls_back_to_id() {
    let t: Troop = serde_json::from_str(&troop_json("")).unwrap();
    assert_eq!(t.display_name(), "t1");
}

#[test]
fn missing_collections_still_deserialize() {
    let ds = BattleDataset::from_json(r#"{"scenes":[{"id":1}]}"#).unwrap();
    assert!(ds.battle_info.armies.is_none());
    assert!(ds.scenes[0].troops.is_none());
    assert!(ds.scenes[0].troops().is_empty());
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = BattleDataset::from_json("{ not json").unwrap_err();
    assert!(matches!(err, BattleError::Serde(_)));
}

#[test]
fn sanitized_status_serializes_lowercase() {
    let mut t: Troop = serde_json::from_str(&troop_json("")).unwrap();
    let v = serde_json::to_value(&t).unwrap();
    assert!(v.get("status").is_none());
    t.status = TroopStatus::Routed.into();
    let v = serde_json::to_value(&t).unwrap();
    assert_eq!(v["status"], "routed");
    assert_eq!(v["type"], "cavalry");
}
