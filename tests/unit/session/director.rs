use super::*;
use crate::{
    foundation::core::{GeoPoint, Size},
    render::{
        projection::WebMercator,
        recording::{RecordingSurface, SurfaceEvent},
    },
    session::reconcile::reconcile,
};

const THREE: &str = include_str!("../../data/three_scene.json");

fn three() -> BattleDataset {
    BattleDataset::from_json(THREE).unwrap()
}

fn surface(ds: &BattleDataset) -> RecordingSurface {
    RecordingSurface::new(WebMercator::new(
        ds.battle_info.location.coordinates,
        15.0,
        Size::new(1280.0, 720.0),
    ))
}

fn play(
    director: &mut AnimationDirector,
    surface: &RecordingSurface,
    ds: &BattleDataset,
    index: usize,
    store: &mut UnitStateStore,
) -> BattleResult<TransitionReport> {
    let plan = reconcile(ds, index, store, 0.0)?;
    pollster::block_on(director.play(surface, &plan, ds, store))
}

fn played_through(index: usize, ds: &BattleDataset) -> (RecordingSurface, UnitStateStore) {
    let s = surface(ds);
    let mut director = AnimationDirector::default();
    let mut store = UnitStateStore::new();
    for i in 0..=index {
        play(&mut director, &s, ds, i, &mut store).unwrap();
    }
    (s, store)
}

#[test]
fn requests_queue_behind_the_in_flight_transition() {
    let mut d = AnimationDirector::default();
    assert_eq!(d.request(1), Admission::Started);
    assert_eq!(d.request(1), Admission::AlreadyInFlight);
    assert_eq!(d.request(2), Admission::Queued);
    assert_eq!(d.request(2), Admission::AlreadyInFlight);
    assert_eq!(d.request(1), Admission::Queued);
    assert_eq!(d.pending().collect::<Vec<_>>(), [2, 1]);

    assert_eq!(d.finish(), Some(2));
    assert_eq!(d.finish(), Some(1));
    assert_eq!(d.finish(), None);
    assert!(!d.is_busy());
}

#[test]
fn abort_drops_the_queue() {
    let mut d = AnimationDirector::default();
    d.request(0);
    d.request(1);
    d.abort();
    assert_eq!(d.in_flight(), None);
    assert_eq!(d.pending().count(), 0);
    assert_eq!(d.request(2), Admission::Started);
}

#[test]
fn arrows_settle_before_any_unit_starts() {
    let ds = three();
    let (s, mut store) = played_through(0, &ds);
    s.take_events();

    let report = play(&mut AnimationDirector::default(), &s, &ds, 1, &mut store).unwrap();
    assert_eq!(report.arrows, 1);
    assert_eq!(report.units_drawn, 2);

    let events = s.events();
    assert_eq!(events[0], SurfaceEvent::Clear);
    let arrow = events
        .iter()
        .find_map(|e| match e {
            SurfaceEvent::Draw {
                handle,
                shape: ShapeSpec::Arrow(a),
                ..
            } => Some((*handle, a.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(arrow.1.unit_id, "u1");
    assert_eq!(arrow.1.color, "#00ff00");
    assert_eq!(arrow.1.opacity, 0.0);

    let last_arrow_end = events
        .iter()
        .rposition(|e| *e == SurfaceEvent::AnimateEnd { handle: arrow.0 })
        .unwrap();
    let first_unit_start = events
        .iter()
        .position(|e| matches!(e, SurfaceEvent::AnimateStart { handle, .. } if *handle != arrow.0))
        .unwrap();
    assert!(last_arrow_end < first_unit_start);

    let SurfaceEvent::AnimateStart { tween, .. } = &events[first_unit_start] else {
        unreachable!()
    };
    assert_eq!(tween.delay_ms, 200);
    assert!(tween.deltas.iter().any(
        |d| matches!(d, PropertyDelta::Rotate { from, to } if *from == 0.0 && (to - 90.0).abs() < 1e-9)
    ));

    let settled_arrow = s.shape(arrow.0).unwrap();
    assert_eq!(settled_arrow.opacity(), 0.8);
}

#[test]
fn outcomes_are_committed_after_the_units_settle() {
    let ds = three();
    let (s, store) = played_through(1, &ds);

    let u1 = store.get("u1").unwrap();
    assert_eq!(u1.position, GeoPoint::new(41.3, 16.14));
    assert_eq!(u1.status, TroopStatus::Active);
    assert_eq!(u1.last_seen_in_scene, 1);
    assert!((u1.facing_deg - 90.0).abs() < 1e-9);

    let u2 = store.get("u2").unwrap();
    assert_eq!(u2.position, GeoPoint::new(41.305, 16.13));
    assert_eq!(u2.last_seen_in_scene, 1);

    let projector = s.projector().unwrap();
    let marker = s.unit("u1").unwrap();
    let expected = projector.project(GeoPoint::new(41.3, 16.14));
    assert!((marker.at - expected).hypot() < 1e-9);
}

#[test]
fn routed_unit_retreats_with_a_red_arrow_and_fades_out() {
    let ds = three();
    let (s, store) = played_through(2, &ds);

    let u1 = store.get("u1").unwrap();
    assert_eq!(u1.status, TroopStatus::Routed);
    assert_eq!(u1.position, GeoPoint::new(41.295, 16.14));
    assert_eq!(s.unit("u1").unwrap().opacity(), 0.0);

    let red_arrows = s
        .shapes()
        .into_iter()
        .filter(|(_, st)| matches!(&st.shape, ShapeSpec::Arrow(a) if a.color == "#ff0000"))
        .count();
    assert_eq!(red_arrows, 1);
}

#[test]
fn defeated_unit_fades_in_place_without_an_arrow() {
    let mut ds = three();
    ds.scenes[2].troops.as_mut().unwrap()[0].status = TroopStatus::Defeated.into();
    let (s, mut store) = played_through(1, &ds);

    let report = play(&mut AnimationDirector::default(), &s, &ds, 2, &mut store).unwrap();
    assert_eq!(report.arrows, 1, "only u2 advances");

    let u1 = store.get("u1").unwrap();
    assert_eq!(u1.status, TroopStatus::Defeated);
    assert_eq!(u1.position, GeoPoint::new(41.3, 16.14));
    assert_eq!(s.unit("u1").unwrap().opacity(), 0.1);
}

#[test]
fn suppressed_units_are_reported_but_not_drawn() {
    let ds = three();
    let (s, mut store) = played_through(2, &ds);
    s.take_events();

    // Replaying scene 2 after u1 left in an earlier scene.
    let earlier = UnitVisualState {
        last_seen_in_scene: 1,
        ..*store.get("u1").unwrap()
    };
    store.set("u1", earlier);
    let report = play(&mut AnimationDirector::default(), &s, &ds, 2, &mut store).unwrap();
    assert_eq!(report.suppressed, ["u1"]);
    assert!(s.unit("u1").is_none());
    assert!(report.outcomes.iter().all(|o| o.unit_id != "u1"));
}

#[test]
fn missing_projection_fails_without_touching_anything() {
    let ds = three();
    let s = RecordingSurface::without_projector();
    let mut store = UnitStateStore::new();

    let err = play(&mut AnimationDirector::default(), &s, &ds, 0, &mut store).unwrap_err();
    assert!(matches!(err, BattleError::ProjectionUnavailable));
    assert!(store.is_empty());
    assert!(s.events().is_empty());
}

#[test]
fn phase_returns_to_idle() {
    let ds = three();
    let s = surface(&ds);
    let mut d = AnimationDirector::default();
    let mut store = UnitStateStore::new();
    play(&mut d, &s, &ds, 0, &mut store).unwrap();
    assert_eq!(d.phase(), TransitionPhase::Idle);
}

#[test]
fn unit_markers_carry_army_style() {
    let ds = three();
    let (s, _) = played_through(0, &ds);
    let ShapeSpec::Unit(u1) = s.unit("u1").unwrap().shape else {
        panic!("u1 is not drawn as a unit");
    };
    assert_eq!(u1.insignia, Insignia::Crossed);
    assert_eq!(u1.color, "#e63946");
    assert_eq!(u1.label, "Red Line");
    assert!((u1.radius - (6.0f64).sqrt() * 5.0).abs() < 1e-12);
}
