use std::collections::VecDeque;

use futures_util::future::join_all;

use crate::{
    animation::{
        ease::Ease,
        tween::{PropertyDelta, Tween},
    },
    foundation::{
        core::Point,
        error::{BattleError, BattleResult},
    },
    render::surface::{
        ArrowShape, GeoProjector, Insignia, RenderSurface, ShapeHandle, ShapeSpec, UnitShape,
    },
    scene::model::{BattleDataset, MovementKind, TroopStatus},
    session::{
        config::DirectorConfig,
        reconcile::{PlanEntry, ScenePlan},
        store::{UnitStateStore, UnitVisualState},
    },
};

const RETREAT_ARROW_COLOR: &str = "#ff0000";
const ADVANCE_ARROW_COLOR: &str = "#00ff00";
const FALLBACK_UNIT_COLOR: &str = "#808080";

/// Where a scene transition currently is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// No transition running.
    #[default]
    Idle,
    /// Movement arrows fading in at their units.
    ArrowsAppearing,
    /// Arrow tips growing towards the destinations.
    ArrowsExtending,
    /// Unit tweens running.
    UnitsAnimating,
}

/// Outcome of [`AnimationDirector::request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Nothing was in flight; the scene becomes the in-flight transition.
    Started,
    /// Queued behind the in-flight transition.
    Queued,
    /// The scene is already in flight or is the last queued request.
    AlreadyInFlight,
}

/// Terminal state of one unit after its animation resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UnitOutcome {
    /// Troop id.
    pub unit_id: String,
    /// State written to the store.
    pub state: UnitVisualState,
}

/// Summary of one settled scene transition.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TransitionReport {
    /// Index of the rendered scene.
    pub scene_index: usize,
    /// Declared id of the rendered scene.
    pub scene_id: u32,
    /// Movement arrows drawn.
    pub arrows: usize,
    /// Unit markers drawn, held units included.
    pub units_drawn: usize,
    /// Units left out because they exited the battle in an earlier scene.
    pub suppressed: Vec<String>,
    /// One outcome per drawn unit, in plan order.
    pub outcomes: Vec<UnitOutcome>,
}

/// Choreographs one scene transition at a time: arrows first, then every unit concurrently.
///
/// Requests that arrive while a transition is in flight are queued, never dropped. Store writes
/// happen only after every unit task has resolved, so a transition either commits all of its
/// outcomes or none.
#[derive(Debug, Default)]
pub struct AnimationDirector {
    config: DirectorConfig,
    phase: TransitionPhase,
    in_flight: Option<usize>,
    pending: VecDeque<usize>,
}

struct DrawnUnit<'a> {
    entry: &'a PlanEntry,
    handle: ShapeHandle,
    start: Point,
    end: Point,
}

impl AnimationDirector {
    /// Idle director with an empty queue.
    pub fn new(config: DirectorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Timings and styling.
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Scene index of the transition being played.
    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight
    }

    /// `true` while a transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Queued scene indices, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending.iter().copied()
    }

    /// Admit a transition to `scene_index`.
    pub fn request(&mut self, scene_index: usize) -> Admission {
        match self.in_flight {
            None => {
                self.in_flight = Some(scene_index);
                Admission::Started
            }
            Some(current) => {
                let last = self.pending.back().copied().unwrap_or(current);
                if last == scene_index {
                    return Admission::AlreadyInFlight;
                }
                tracing::debug!(scene_index, in_flight = current, "scene request queued");
                self.pending.push_back(scene_index);
                Admission::Queued
            }
        }
    }

    /// Mark the in-flight transition settled and promote the next queued request.
    pub fn finish(&mut self) -> Option<usize> {
        self.phase = TransitionPhase::Idle;
        self.in_flight = self.pending.pop_front();
        self.in_flight
    }

    /// Drop the in-flight transition and everything queued behind it.
    pub fn abort(&mut self) {
        if self.in_flight.is_some() || !self.pending.is_empty() {
            tracing::debug!(dropped = self.pending.len(), "scene queue aborted");
        }
        self.phase = TransitionPhase::Idle;
        self.in_flight = None;
        self.pending.clear();
    }

    /// Render `plan` on `surface` and commit every unit's outcome to `store`.
    ///
    /// Fails with [`BattleError::ProjectionUnavailable`] before touching the surface or the store
    /// when the surface cannot project.
    #[tracing::instrument(skip_all, fields(scene_index = plan.scene_index))]
    pub async fn play<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &S,
        plan: &ScenePlan,
        dataset: &BattleDataset,
        store: &mut UnitStateStore,
    ) -> BattleResult<TransitionReport> {
        let projector = surface
            .projector()
            .ok_or(BattleError::ProjectionUnavailable)?;
        if self.phase != TransitionPhase::Idle {
            tracing::warn!(phase = ?self.phase, "previous transition was abandoned mid-flight");
        }
        let cfg = self.config;

        surface.clear_all();
        let drawn: Vec<DrawnUnit<'_>> = plan
            .renderable()
            .map(|entry| draw_unit(surface, projector, entry, dataset, &cfg))
            .collect();

        self.set_phase(TransitionPhase::ArrowsAppearing);
        let arrows: Vec<(ShapeHandle, Point, Point)> = drawn
            .iter()
            .filter(|d| d.entry.is_moving() && d.entry.status() != TroopStatus::Defeated)
            .map(|d| {
                let shape = ShapeSpec::Arrow(ArrowShape {
                    unit_id: d.entry.troop.id.clone(),
                    movement: d.entry.troop.movement.kind,
                    color: arrow_color(d.entry.troop.movement.kind).to_string(),
                    tip: d.start,
                    opacity: 0.0,
                });
                (surface.draw(d.start, shape), d.start, d.end)
            })
            .collect();
        join_all(arrows.iter().map(|&(handle, _, _)| {
            let fade = Tween::new(cfg.arrow_fade_ms, Ease::Linear).with(PropertyDelta::Opacity {
                from: 0.0,
                to: cfg.arrow_opacity,
            });
            surface.animate(handle, fade)
        }))
        .await;

        self.set_phase(TransitionPhase::ArrowsExtending);
        join_all(arrows.iter().map(|&(handle, from, to)| {
            let extend =
                Tween::new(cfg.arrow_extend_ms, cfg.arrow_ease).with(PropertyDelta::Extend { from, to });
            surface.animate(handle, extend)
        }))
        .await;

        self.set_phase(TransitionPhase::UnitsAnimating);
        let tasks = drawn.iter().map(|d| {
            let (tween, outcome) = unit_motion(d, plan.scene_index, &cfg);
            async move {
                if let Some(tween) = tween {
                    surface.animate(d.handle, tween).await;
                }
                outcome
            }
        });
        let outcomes: Vec<UnitOutcome> = join_all(tasks).await;

        for outcome in &outcomes {
            store.set(outcome.unit_id.clone(), outcome.state);
        }
        self.set_phase(TransitionPhase::Idle);

        Ok(TransitionReport {
            scene_index: plan.scene_index,
            scene_id: plan.scene_id,
            arrows: arrows.len(),
            units_drawn: drawn.len(),
            suppressed: plan.suppressed().map(|e| e.troop.id.clone()).collect(),
            outcomes,
        })
    }

    fn set_phase(&mut self, phase: TransitionPhase) {
        tracing::debug!(?phase, "transition phase");
        self.phase = phase;
    }
}

fn draw_unit<'a, S: RenderSurface + ?Sized>(
    surface: &S,
    projector: &dyn GeoProjector,
    entry: &'a PlanEntry,
    dataset: &BattleDataset,
    cfg: &DirectorConfig,
) -> DrawnUnit<'a> {
    let troop = &entry.troop;
    let color = dataset
        .army(&troop.side)
        .and_then(|a| a.color.as_deref())
        .unwrap_or(FALLBACK_UNIT_COLOR);
    let start = projector.project(entry.start_position);
    let end = projector.project(entry.end_position);
    let shape = ShapeSpec::Unit(UnitShape {
        unit_id: troop.id.clone(),
        side: troop.side.clone(),
        label: troop.display_name().to_string(),
        insignia: Insignia::for_kind(&troop.kind),
        color: color.to_string(),
        radius: cfg.unit_radius(troop.size),
        angle_deg: entry.start_angle,
        opacity: 1.0,
    });
    DrawnUnit {
        entry,
        handle: surface.draw(start, shape),
        start,
        end,
    }
}

fn arrow_color(kind: MovementKind) -> &'static str {
    match kind {
        MovementKind::Retreat => RETREAT_ARROW_COLOR,
        MovementKind::Static | MovementKind::Advance | MovementKind::Flank => ADVANCE_ARROW_COLOR,
    }
}

/// Tween to run for a unit, if any, and the state it settles in.
fn unit_motion(
    d: &DrawnUnit<'_>,
    scene_index: usize,
    cfg: &DirectorConfig,
) -> (Option<Tween>, UnitOutcome) {
    let entry = d.entry;
    let settled = |position, status, facing_deg| UnitOutcome {
        unit_id: entry.troop.id.clone(),
        state: UnitVisualState {
            position,
            status,
            last_seen_in_scene: scene_index,
            facing_deg,
        },
    };

    match entry.status() {
        TroopStatus::Defeated => {
            let tween = Tween::new(cfg.fade_ms, cfg.unit_ease)
                .with_delay(cfg.unit_delay_ms)
                .with(PropertyDelta::Opacity {
                    from: 1.0,
                    to: cfg.defeated_opacity,
                });
            (
                Some(tween),
                settled(entry.start_position, TroopStatus::Defeated, entry.start_angle),
            )
        }
        TroopStatus::Routed => {
            let tween = Tween::new(cfg.unit_move_ms, cfg.unit_ease)
                .with_delay(cfg.unit_delay_ms)
                .with(PropertyDelta::Translate {
                    from: d.start,
                    to: d.end,
                })
                .with(PropertyDelta::Opacity { from: 1.0, to: 0.0 });
            (
                Some(tween),
                settled(entry.end_position, TroopStatus::Routed, entry.start_angle),
            )
        }
        TroopStatus::Active if entry.is_moving() => {
            let tween = Tween::new(cfg.unit_move_ms, cfg.unit_ease)
                .with_delay(cfg.unit_delay_ms)
                .with(PropertyDelta::Translate {
                    from: d.start,
                    to: d.end,
                })
                .with(PropertyDelta::Rotate {
                    from: entry.start_angle,
                    to: entry.end_angle,
                });
            (
                Some(tween),
                settled(entry.end_position, TroopStatus::Active, entry.end_angle),
            )
        }
        TroopStatus::Active => (
            None,
            settled(entry.start_position, TroopStatus::Active, entry.start_angle),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/director.rs"]
mod tests;
