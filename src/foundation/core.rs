pub use kurbo::{Point, Size, Vec2};

/// Geographic coordinate in decimal degrees (WGS84).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Latitude, degrees north.
    pub lat: f64,
    /// Longitude, degrees east.
    pub lng: f64,
}

impl GeoPoint {
    /// Construct a point from latitude and longitude.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `true` when both components are within `eps` of `other`.
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.lat - other.lat).abs() <= eps && (self.lng - other.lng).abs() <= eps
    }
}

/// Axis-aligned bounding box in latitude/longitude space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GeoBounds {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl GeoBounds {
    /// Degenerate bounds containing a single point.
    pub fn at(p: GeoPoint) -> Self {
        Self {
            min_lat: p.lat,
            max_lat: p.lat,
            min_lng: p.lng,
            max_lng: p.lng,
        }
    }

    /// Smallest bounds containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::at(first), Self::include))
    }

    /// Grow the bounds to contain `p`.
    pub fn include(self, p: GeoPoint) -> Self {
        Self {
            min_lat: self.min_lat.min(p.lat),
            max_lat: self.max_lat.max(p.lat),
            min_lng: self.min_lng.min(p.lng),
            max_lng: self.max_lng.max(p.lng),
        }
    }

    /// Latitude extent in degrees.
    pub fn lat_span(self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn lng_span(self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Centre of the box.
    pub fn center(self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Facing angle in degrees for a unit travelling from `from` to `to`.
///
/// `0` is east. The result is the travel bearing `atan2(dlat, dlng)` rotated by +90 degrees so a
/// unit's long axis lies perpendicular to its direction of travel.
pub fn facing_angle_deg(from: GeoPoint, to: GeoPoint) -> f64 {
    let dlat = to.lat - from.lat;
    let dlng = to.lng - from.lng;
    dlat.atan2(dlng).to_degrees() + 90.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
