use crate::{
    foundation::core::{GeoBounds, GeoPoint},
    scene::model::BattleDataset,
};

/// Tunables for [`normalize_coordinates`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Spread in degrees for a battle with `reference_count` troops in its busiest scene.
    pub base_spread: f64,
    /// Lower clamp of the spread.
    pub min_spread: f64,
    /// Upper clamp of the spread.
    pub max_spread: f64,
    /// Troop count at which the spread equals `base_spread`.
    pub reference_count: usize,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            base_spread: 0.008,
            min_spread: 0.004,
            max_spread: 0.016,
            reference_count: 10,
        }
    }
}

impl NormalizeConfig {
    /// Angular spread the layout is rescaled into, given the busiest scene's troop count.
    pub fn target_spread(&self, max_troops: usize) -> f64 {
        let reference = self.reference_count.max(1) as f64;
        let raw = self.base_spread * (max_troops as f64 / reference).sqrt();
        raw.max(self.min_spread).min(self.max_spread)
    }
}

/// Bounds and factors of one normalization.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct NormalizeReport {
    /// Bounds of every coordinate before rescaling.
    pub before: GeoBounds,
    /// Bounds after rescaling.
    pub after: GeoBounds,
    /// Spread both axes were scaled into.
    pub target_spread: f64,
    /// Latitude factor.
    pub scale_lat: f64,
    /// Longitude factor.
    pub scale_lng: f64,
}

/// Rescale every troop position and movement destination into the target spread.
///
/// The transform is affine about the centre of the bounding box of all coordinates in all
/// scenes, with independent latitude and longitude factors, so relative layout is preserved.
/// Re-running with the same config leaves coordinates unchanged up to rounding. Returns `None`
/// when the dataset has no troops.
#[tracing::instrument(skip_all)]
pub fn normalize_coordinates(
    dataset: &mut BattleDataset,
    config: &NormalizeConfig,
) -> Option<NormalizeReport> {
    let before = GeoBounds::from_points(
        dataset
            .scenes
            .iter()
            .flat_map(|s| s.troops())
            .flat_map(|t| [t.position, t.movement.to]),
    )?;
    let max_troops = dataset
        .scenes
        .iter()
        .map(|s| s.troops().len())
        .max()
        .unwrap_or(0);

    let target_spread = config.target_spread(max_troops);
    let scale_lat = target_spread / observed(before.lat_span());
    let scale_lng = target_spread / observed(before.lng_span());
    let center = before.center();

    let apply = |p: GeoPoint| {
        GeoPoint::new(
            center.lat + (p.lat - center.lat) * scale_lat,
            center.lng + (p.lng - center.lng) * scale_lng,
        )
    };
    for troop in dataset.troops_mut() {
        troop.position = apply(troop.position);
        troop.movement.to = apply(troop.movement.to);
    }

    let after = GeoBounds {
        min_lat: apply(GeoPoint::new(before.min_lat, center.lng)).lat,
        max_lat: apply(GeoPoint::new(before.max_lat, center.lng)).lat,
        min_lng: apply(GeoPoint::new(center.lat, before.min_lng)).lng,
        max_lng: apply(GeoPoint::new(center.lat, before.max_lng)).lng,
    };
    tracing::debug!(
        target_spread,
        scale_lat,
        scale_lng,
        max_troops,
        "normalized battle coordinates"
    );

    Some(NormalizeReport {
        before,
        after,
        target_spread,
        scale_lat,
        scale_lng,
    })
}

fn observed(span: f64) -> f64 {
    if span > 0.0 { span } else { 1.0 }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/coords.rs"]
mod tests;
