use futures_util::future::LocalBoxFuture;

use crate::{
    animation::tween::Tween,
    foundation::core::{GeoPoint, Point},
    scene::model::{MovementKind, UnitKind},
};

/// Geographic to screen conversion provided by the hosting map viewport.
pub trait GeoProjector {
    /// Screen position of a coordinate.
    fn project(&self, geo: GeoPoint) -> Point;
    /// Coordinate under a screen position.
    fn unproject(&self, screen: Point) -> GeoPoint;
}

/// Opaque id of a shape drawn on a [`RenderSurface`]. Valid until the next `clear_all`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ShapeHandle(pub u64);

/// Symbol drawn inside a unit marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Insignia {
    /// Crossed lines.
    Crossed,
    /// Single diagonal stroke.
    Diagonal,
    /// Filled dot.
    Dot,
    /// Anchor glyph.
    Anchor,
    /// Empty marker for unrecognised kinds.
    Plain,
}

impl Insignia {
    /// Insignia for a unit kind.
    pub fn for_kind(kind: &UnitKind) -> Self {
        match kind {
            UnitKind::Infantry => Self::Crossed,
            UnitKind::Cavalry => Self::Diagonal,
            UnitKind::Artillery => Self::Dot,
            UnitKind::Naval => Self::Anchor,
            UnitKind::Other(_) => Self::Plain,
        }
    }
}

/// Circular unit marker with insignia and label.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UnitShape {
    /// Troop id.
    pub unit_id: String,
    /// Army the troop belongs to.
    pub side: String,
    /// Text under the marker.
    pub label: String,
    /// Symbol inside the marker.
    pub insignia: Insignia,
    /// Fill colour.
    pub color: String,
    /// Marker radius in pixels.
    pub radius: f64,
    /// Facing, clockwise from north.
    pub angle_deg: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Movement indicator. Drawn with its tip on its anchor and extended by animation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ArrowShape {
    /// Troop the arrow belongs to.
    pub unit_id: String,
    /// Movement it depicts.
    pub movement: MovementKind,
    /// Stroke colour.
    pub color: String,
    /// Current tip position.
    pub tip: Point,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Anything a [`RenderSurface`] can draw.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Unit marker.
    Unit(UnitShape),
    /// Movement arrow.
    Arrow(ArrowShape),
}

/// Drawing capability consumed by the animation director.
///
/// Everything runs on one cooperative thread, so methods take `&self`; implementations keep
/// their mutable state behind `Cell`/`RefCell`. The future returned by [`RenderSurface::animate`]
/// resolves once the tween has settled on screen.
pub trait RenderSurface {
    /// `None` when the viewport cannot currently project coordinates.
    fn projector(&self) -> Option<&dyn GeoProjector>;

    /// Add a shape anchored at `at`.
    fn draw(&self, at: Point, shape: ShapeSpec) -> ShapeHandle;

    /// Run `tween` on a drawn shape.
    fn animate(&self, handle: ShapeHandle, tween: Tween) -> LocalBoxFuture<'_, ()>;

    /// Remove every shape; outstanding handles become invalid.
    fn clear_all(&self);
}
