//! Battlemap turns a scene-by-scene battle dataset into animated map transitions.
//!
//! The API is viewer-oriented:
//!
//! - Parse a [`BattleDataset`] and load it into a [`BattleViewer`] (validation, coordinate
//!   normalization and layout correction happen here)
//! - Navigate with [`BattleViewer::go_to_scene`], [`BattleViewer::next_scene`] and
//!   [`BattleViewer::previous_scene`]; each call returns once arrows and units have settled
//! - Draw through any [`RenderSurface`]; [`RecordingSurface`] is a headless one
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod normalize;
pub(crate) mod render;
pub(crate) mod scene;
pub(crate) mod session;

pub use crate::foundation::core::{GeoBounds, GeoPoint, Point, Size, Vec2, facing_angle_deg};
pub use crate::foundation::error::{BattleError, BattleResult, DataIntegrityWarning};

pub use crate::animation::ease::Ease;
pub use crate::animation::tween::{Lerp, PropertyDelta, PropertyValue, Tween};
pub use crate::normalize::coords::{NormalizeConfig, NormalizeReport, normalize_coordinates};
pub use crate::normalize::layout::{
    FlankRole, LayoutAdjustment, LayoutConfig, LayoutReport, LayoutRule, correct_layout,
};
pub use crate::render::projection::WebMercator;
pub use crate::render::recording::{RecordingSurface, ShapeState, SurfaceEvent};
pub use crate::render::surface::{
    ArrowShape, GeoProjector, Insignia, RenderSurface, ShapeHandle, ShapeSpec, UnitShape,
};
pub use crate::scene::model::{
    Army, BattleDataset, BattleInfo, DeclaredStatus, Location, Movement, MovementKind, Scene,
    Troop, TroopStatus, UnitKind,
};
pub use crate::session::config::{DirectorConfig, EngineConfig, ViewportConfig};
pub use crate::session::director::{
    Admission, AnimationDirector, TransitionPhase, TransitionReport, UnitOutcome,
};
pub use crate::session::prepare::{LoadReport, prepare_dataset};
pub use crate::session::reconcile::{EntryOrigin, PlanEntry, ScenePlan, reconcile};
pub use crate::session::store::{UnitStateStore, UnitVisualState};
pub use crate::session::viewer::BattleViewer;
