use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::future::LocalBoxFuture;

use crate::{
    animation::tween::{PropertyValue, Tween},
    foundation::core::Point,
    render::{
        projection::WebMercator,
        surface::{GeoProjector, RenderSurface, ShapeHandle, ShapeSpec},
    },
};

/// One call observed by a [`RecordingSurface`], in call order.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    /// `clear_all`.
    Clear,
    /// `draw`.
    Draw {
        /// Handle returned to the caller.
        handle: ShapeHandle,
        /// Screen anchor.
        at: Point,
        /// Shape as drawn.
        shape: ShapeSpec,
    },
    /// An `animate` future was first polled.
    AnimateStart {
        /// Animated shape.
        handle: ShapeHandle,
        /// Tween being run.
        tween: Tween,
    },
    /// An `animate` future resolved.
    AnimateEnd {
        /// Animated shape.
        handle: ShapeHandle,
    },
}

/// Settled state of a drawn shape after every completed tween has been applied.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShapeState {
    /// Screen anchor.
    pub at: Point,
    /// Shape with every settled property applied.
    pub shape: ShapeSpec,
}

impl ShapeState {
    fn apply(&mut self, value: PropertyValue) {
        match (value, &mut self.shape) {
            (PropertyValue::Translate(p), _) => self.at = p,
            (PropertyValue::Opacity(o), ShapeSpec::Unit(u)) => u.opacity = o,
            (PropertyValue::Opacity(o), ShapeSpec::Arrow(a)) => a.opacity = o,
            (PropertyValue::Rotate(deg), ShapeSpec::Unit(u)) => u.angle_deg = deg,
            (PropertyValue::Extend(p), ShapeSpec::Arrow(a)) => a.tip = p,
            (PropertyValue::Rotate(_) | PropertyValue::Extend(_), _) => {}
        }
    }

    /// Current opacity of either shape kind.
    pub fn opacity(&self) -> f64 {
        match &self.shape {
            ShapeSpec::Unit(u) => u.opacity,
            ShapeSpec::Arrow(a) => a.opacity,
        }
    }
}

/// Headless [`RenderSurface`] that logs every call and tracks the settled shape states.
///
/// Animations do not take wall time: each one completes after yielding to the executor once, so
/// concurrently started tweens interleave the way they would on a real display.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    projector: Option<WebMercator>,
    events: RefCell<Vec<SurfaceEvent>>,
    shapes: RefCell<BTreeMap<ShapeHandle, ShapeState>>,
    next_handle: Cell<u64>,
}

impl RecordingSurface {
    /// Empty surface projecting through `projector`.
    pub fn new(projector: WebMercator) -> Self {
        Self {
            projector: Some(projector),
            ..Self::default()
        }
    }

    /// A surface whose viewport is not ready to project coordinates.
    pub fn without_projector() -> Self {
        Self::default()
    }

    /// Attach or detach the projector.
    pub fn set_projector(&mut self, projector: Option<WebMercator>) {
        self.projector = projector;
    }

    /// Every event so far.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    /// Every event so far, clearing the log.
    pub fn take_events(&self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Settled state of `handle`; `None` once cleared.
    pub fn shape(&self, handle: ShapeHandle) -> Option<ShapeState> {
        self.shapes.borrow().get(&handle).cloned()
    }

    /// Shapes currently on the surface, in draw order.
    pub fn shapes(&self) -> Vec<(ShapeHandle, ShapeState)> {
        self.shapes
            .borrow()
            .iter()
            .map(|(h, s)| (*h, s.clone()))
            .collect()
    }

    /// Settled marker of the given unit, if one is drawn.
    pub fn unit(&self, unit_id: &str) -> Option<ShapeState> {
        self.shapes
            .borrow()
            .values()
            .find(|s| matches!(&s.shape, ShapeSpec::Unit(u) if u.unit_id == unit_id))
            .cloned()
    }

    fn settle(&self, handle: ShapeHandle, values: impl IntoIterator<Item = PropertyValue>) {
        if let Some(state) = self.shapes.borrow_mut().get_mut(&handle) {
            for v in values {
                state.apply(v);
            }
        }
        self.events
            .borrow_mut()
            .push(SurfaceEvent::AnimateEnd { handle });
    }
}

impl RenderSurface for RecordingSurface {
    fn projector(&self) -> Option<&dyn GeoProjector> {
        self.projector.as_ref().map(|p| p as &dyn GeoProjector)
    }

    fn draw(&self, at: Point, shape: ShapeSpec) -> ShapeHandle {
        let handle = ShapeHandle(self.next_handle.get());
        self.next_handle.set(handle.0 + 1);
        self.shapes.borrow_mut().insert(
            handle,
            ShapeState {
                at,
                shape: shape.clone(),
            },
        );
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Draw { handle, at, shape });
        handle
    }

    fn animate(&self, handle: ShapeHandle, tween: Tween) -> LocalBoxFuture<'_, ()> {
        let end = tween.end_values();
        self.events
            .borrow_mut()
            .push(SurfaceEvent::AnimateStart { handle, tween });
        Box::pin(async move {
            YieldNow::default().await;
            self.settle(handle, end);
        })
    }

    fn clear_all(&self) {
        self.shapes.borrow_mut().clear();
        self.next_handle.set(0);
        self.events.borrow_mut().push(SurfaceEvent::Clear);
    }
}

#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
