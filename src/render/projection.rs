use std::f64::consts::PI;

use crate::{
    foundation::core::{GeoPoint, Point, Size},
    render::surface::GeoProjector,
};

const TILE_SIZE: f64 = 256.0;
/// Latitude at which the Web Mercator square world ends.
const MAX_LAT: f64 = 85.051_128_78;

/// Web Mercator projection onto a viewport centred on a fixed coordinate.
///
/// Matches slippy-map tiling: 256-pixel tiles, `2^zoom` tiles per axis, y growing south.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WebMercator {
    center: GeoPoint,
    zoom: f64,
    viewport: Size,
}

impl WebMercator {
    /// Projector centred on `center` at `zoom`, for a viewport of `viewport` pixels.
    pub fn new(center: GeoPoint, zoom: f64, viewport: Size) -> Self {
        Self {
            center,
            zoom,
            viewport,
        }
    }

    /// Coordinate at the viewport centre.
    pub fn center(&self) -> GeoPoint {
        self.center
    }

    /// Zoom level.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    fn to_world(&self, geo: GeoPoint) -> Point {
        let s = self.world_size();
        let lat = geo.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
        let x = (geo.lng + 180.0) / 360.0 * s;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * s;
        Point::new(x, y)
    }

    fn from_world(&self, p: Point) -> GeoPoint {
        let s = self.world_size();
        let lng = p.x / s * 360.0 - 180.0;
        let n = PI - 2.0 * PI * p.y / s;
        let lat = n.sinh().atan().to_degrees();
        GeoPoint::new(lat, lng)
    }

    fn origin(&self) -> Point {
        let c = self.to_world(self.center);
        Point::new(
            c.x - self.viewport.width / 2.0,
            c.y - self.viewport.height / 2.0,
        )
    }
}

impl GeoProjector for WebMercator {
    fn project(&self, geo: GeoPoint) -> Point {
        (self.to_world(geo) - self.origin()).to_point()
    }

    fn unproject(&self, screen: Point) -> GeoPoint {
        self.from_world(screen + self.origin().to_vec2())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/projection.rs"]
mod tests;
