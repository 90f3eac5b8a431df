use std::path::Path;

use crate::{
    animation::ease::Ease,
    foundation::error::{BattleError, BattleResult},
    normalize::{coords::NormalizeConfig, layout::LayoutConfig},
};

/// Every tunable of the engine. Missing fields fall back to their defaults.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Coordinate rescaling.
    pub normalize: NormalizeConfig,
    /// Flank and cavalry corrections.
    pub layout: LayoutConfig,
    /// Transition timings and marker styling.
    pub director: DirectorConfig,
    /// Facing assigned to every unit on initial deployment.
    pub default_facing_deg: f64,
    /// Headless viewport for the CLI and tests.
    pub viewport: ViewportConfig,
}

impl EngineConfig {
    /// Parse and validate a config from JSON text.
    pub fn from_json(s: &str) -> BattleResult<Self> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| BattleError::serde(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn from_path(path: impl AsRef<Path>) -> BattleResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            BattleError::Other(
                anyhow::Error::new(e).context(format!("read engine config '{}'", path.display())),
            )
        })?;
        Self::from_json(&text)
    }

    /// Reject values the engine cannot run with: non-finite numbers, inverted clamp ranges,
    /// a zero reference troop count and an empty viewport.
    pub fn validate(&self) -> BattleResult<()> {
        let n = &self.normalize;
        finite("normalize.base_spread", n.base_spread)?;
        finite("normalize.min_spread", n.min_spread)?;
        finite("normalize.max_spread", n.max_spread)?;
        ordered("normalize", "min_spread", n.min_spread, "max_spread", n.max_spread)?;
        if n.reference_count == 0 {
            return Err(BattleError::validation(
                "config normalize.reference_count must be at least 1",
            ));
        }

        finite("layout.flank_margin", self.layout.flank_margin)?;
        finite("layout.cavalry_margin", self.layout.cavalry_margin)?;

        let d = &self.director;
        finite("director.arrow_opacity", d.arrow_opacity)?;
        finite("director.defeated_opacity", d.defeated_opacity)?;
        finite("director.unit_radius_scale", d.unit_radius_scale)?;
        finite("director.min_unit_radius", d.min_unit_radius)?;
        finite("director.max_unit_radius", d.max_unit_radius)?;
        ordered(
            "director",
            "min_unit_radius",
            d.min_unit_radius,
            "max_unit_radius",
            d.max_unit_radius,
        )?;

        finite("default_facing_deg", self.default_facing_deg)?;

        let v = &self.viewport;
        finite("viewport.zoom", v.zoom)?;
        if !(v.width.is_finite() && v.height.is_finite() && v.width > 0.0 && v.height > 0.0) {
            return Err(BattleError::validation(format!(
                "config viewport must have a positive size, got {}x{}",
                v.width, v.height
            )));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> BattleResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BattleError::validation(format!(
            "config {field} must be finite, got {value}"
        )))
    }
}

fn ordered(section: &str, lo_name: &str, lo: f64, hi_name: &str, hi: f64) -> BattleResult<()> {
    if lo <= hi {
        Ok(())
    } else {
        Err(BattleError::validation(format!(
            "config {section}.{lo_name} ({lo}) exceeds {section}.{hi_name} ({hi})"
        )))
    }
}

/// Timings and styling of a scene transition. Durations are milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DirectorConfig {
    /// Arrow fade-in.
    pub arrow_fade_ms: u64,
    /// Arrow growth towards the destination.
    pub arrow_extend_ms: u64,
    /// Pause before unit animations start once arrows are in place.
    pub unit_delay_ms: u64,
    /// Movement, rotation and routed fade.
    pub unit_move_ms: u64,
    /// Fade of a defeated unit.
    pub fade_ms: u64,
    /// Opacity arrows fade in to.
    pub arrow_opacity: f64,
    /// Residual opacity of a defeated unit.
    pub defeated_opacity: f64,
    /// Pixels per square root of a thousand soldiers.
    pub unit_radius_scale: f64,
    /// Smallest marker radius in pixels.
    pub min_unit_radius: f64,
    /// Largest marker radius in pixels.
    pub max_unit_radius: f64,
    /// Curve of the arrow extension.
    pub arrow_ease: Ease,
    /// Curve of unit tweens.
    pub unit_ease: Ease,
}

impl Default for DirectorConfig {
    fn default() -> Self {
        Self {
            arrow_fade_ms: 300,
            arrow_extend_ms: 800,
            unit_delay_ms: 200,
            unit_move_ms: 1500,
            fade_ms: 1000,
            arrow_opacity: 0.8,
            defeated_opacity: 0.1,
            unit_radius_scale: 5.0,
            min_unit_radius: 4.0,
            max_unit_radius: 40.0,
            arrow_ease: Ease::OutCubic,
            unit_ease: Ease::Linear,
        }
    }
}

impl DirectorConfig {
    /// Marker radius in pixels for a formation of `size` soldiers.
    pub fn unit_radius(&self, size: u32) -> f64 {
        ((f64::from(size) / 1000.0).sqrt() * self.unit_radius_scale)
            .max(self.min_unit_radius)
            .min(self.max_unit_radius)
    }
}

/// Screen viewport used when no host map is attached.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
    /// Web Mercator zoom level; may be fractional.
    pub zoom: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            zoom: 15.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
