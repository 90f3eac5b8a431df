/// Progress curve of a tween.
///
/// Unit motion uses [`Ease::Linear`] so translation and rotation stay in lockstep; arrows extend
/// with [`Ease::OutCubic`] by default so they shoot out and settle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    /// Constant rate.
    #[default]
    Linear,
    /// Decelerating, quadratic.
    OutQuad,
    /// Accelerating then decelerating, quadratic.
    InOutQuad,
    /// Decelerating, cubic.
    OutCubic,
    /// Accelerating then decelerating, cubic.
    InOutCubic,
}

impl Ease {
    /// Map tween progress `t` onto property progress.
    ///
    /// `t` is clamped to `[0, 1]`, so every curve starts at exactly 0 and lands on exactly 1.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => ease_out(t, 2),
            Self::InOutQuad => ease_in_out(t, 2),
            Self::OutCubic => ease_out(t, 3),
            Self::InOutCubic => ease_in_out(t, 3),
        }
    }
}

fn ease_out(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

/// `2^(p-1) * t^p` on the first half, mirrored about `(0.5, 0.5)` on the second.
fn ease_in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (2.0 - 2.0 * t).powi(power) / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
