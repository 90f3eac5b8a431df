use smallvec::SmallVec;

use crate::{animation::ease::Ease, foundation::core::Point};

/// Linear interpolation that lands exactly on both endpoints.
pub trait Lerp: Sized {
    /// Value at progress `t`, where `0` is `a` and `1` is `b`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a * (1.0 - t) + b * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(
            <f64 as Lerp>::lerp(&a.x, &b.x, t),
            <f64 as Lerp>::lerp(&a.y, &b.y, t),
        )
    }
}

/// One animated property of a drawn shape, from its current value to a target.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum PropertyDelta {
    /// Shape opacity in `[0, 1]`.
    Opacity {
        /// Opacity when the tween starts.
        from: f64,
        /// Opacity once settled.
        to: f64,
    },
    /// Shape anchor position in screen space.
    Translate {
        /// Anchor when the tween starts.
        from: Point,
        /// Anchor once settled.
        to: Point,
    },
    /// Facing angle in degrees, interpolated without wrapping.
    Rotate {
        /// Angle when the tween starts.
        from: f64,
        /// Angle once settled.
        to: f64,
    },
    /// Arrow tip position in screen space; the tail stays put.
    Extend {
        /// Tip when the tween starts.
        from: Point,
        /// Tip once settled.
        to: Point,
    },
}

/// Sampled value of a [`PropertyDelta`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Opacity in `[0, 1]`.
    Opacity(f64),
    /// Anchor position.
    Translate(Point),
    /// Facing angle in degrees.
    Rotate(f64),
    /// Arrow tip position.
    Extend(Point),
}

impl PropertyDelta {
    /// Value at eased progress `t`.
    pub fn sample(&self, t: f64) -> PropertyValue {
        match *self {
            Self::Opacity { from, to } => PropertyValue::Opacity(<f64 as Lerp>::lerp(&from, &to, t)),
            Self::Translate { from, to } => {
                PropertyValue::Translate(<Point as Lerp>::lerp(&from, &to, t))
            }
            Self::Rotate { from, to } => PropertyValue::Rotate(<f64 as Lerp>::lerp(&from, &to, t)),
            Self::Extend { from, to } => {
                PropertyValue::Extend(<Point as Lerp>::lerp(&from, &to, t))
            }
        }
    }
}

/// A set of property deltas animated together over one duration.
///
/// `delay_ms` elapses before any property starts moving; all deltas share the same easing so
/// translation and rotation stay in lockstep.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Tween {
    /// Properties animated together.
    pub deltas: SmallVec<[PropertyDelta; 3]>,
    /// Wait before any property moves.
    pub delay_ms: u64,
    /// Time from first movement to settle.
    pub duration_ms: u64,
    /// Curve shared by every delta.
    pub ease: Ease,
}

impl Tween {
    /// An empty tween with no delay.
    pub fn new(duration_ms: u64, ease: Ease) -> Self {
        Self {
            deltas: SmallVec::new(),
            delay_ms: 0,
            duration_ms,
            ease,
        }
    }

    /// Set the start delay.
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Add a property delta.
    pub fn with(mut self, delta: PropertyDelta) -> Self {
        self.deltas.push(delta);
        self
    }

    /// Total wall time from start to settle.
    pub fn total_ms(&self) -> u64 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    /// Sample every delta at `elapsed_ms` since the tween was started.
    pub fn sample_at(&self, elapsed_ms: u64) -> SmallVec<[PropertyValue; 3]> {
        let t = if self.duration_ms == 0 {
            if elapsed_ms >= self.delay_ms { 1.0 } else { 0.0 }
        } else if elapsed_ms <= self.delay_ms {
            0.0
        } else {
            (elapsed_ms - self.delay_ms) as f64 / self.duration_ms as f64
        };
        let te = self.ease.apply(t);
        self.deltas.iter().map(|d| d.sample(te)).collect()
    }

    /// Values once the tween has settled.
    pub fn end_values(&self) -> SmallVec<[PropertyValue; 3]> {
        self.sample_at(self.total_ms())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
