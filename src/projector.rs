//! Lat/lon to screen pixel projection for the fixed world map image.
//!
//! The map is a Mercator tile rendering 16 tiles wide at 256 px per tile. The
//! scale and corrector constants were measured against that image and are
//! kept exactly as measured: changing any of them shifts every pin.

use std::f64::consts::PI;

/// Width of the reference map the constants were measured on
const SCALE_DIVISOR: f64 = 720.0;

const SCALE_MULTIPLIER: f64 = 0.169;

const X_CORRECTOR: f64 = 1.1;

const Y_CORRECTOR: f64 = 70.0;

const PIXELS_PER_LONGITUDE_DEGREE: f64 = 16.0 / 360.0;

const NEGATIVE_PIXELS_PER_LONGITUDE_RADIAN: f64 = -(16.0 / (2.0 * PI));

const BITMAP_ORIGIN: f64 = 16.0 / 2.0;

const TILE_SIZE: f64 = 256.0;

/// Keeps `ln((1+e)/(1-e))` finite at the poles
const SIN_LAT_LIMIT: f64 = 0.9999;

/// A position in display pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

/// Scale and correction values for one (map, display) size pair.
///
/// Rebuilt on every viewport resize, never per draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGeometry {
    pub scale: f64,
    pub x_corrector: f64,
    pub y_corrector: f64,
    /// Display width / native map width
    pub x_map_scale: f64,
    /// Display height / native map height
    pub y_map_scale: f64,
    pub map_width: u32,
    pub map_height: u32,
    pub display_width: u32,
    pub display_height: u32,
}

impl ViewportGeometry {
    pub fn new(map_width: u32, map_height: u32, display_width: u32, display_height: u32) -> Self {
        let relative_width = map_width as f64 / SCALE_DIVISOR;
        Self {
            scale: relative_width * SCALE_MULTIPLIER,
            x_corrector: X_CORRECTOR * relative_width,
            y_corrector: Y_CORRECTOR * relative_width,
            x_map_scale: ratio(display_width, map_width),
            y_map_scale: ratio(display_height, map_height),
            map_width,
            map_height,
            display_width,
            display_height,
        }
    }

    /// Geometry for drawing on the native map itself (no display scaling)
    pub fn native(map_width: u32, map_height: u32) -> Self {
        Self::new(map_width, map_height, map_width, map_height)
    }
}

fn ratio(display: u32, native: u32) -> f64 {
    if native == 0 {
        0.0
    } else {
        display as f64 / native as f64
    }
}

/// Absolute position on the 16x16 tile world, before map scaling
fn global_pixel(lat: f64, lon: f64) -> (f64, f64) {
    let global_x = (BITMAP_ORIGIN + lon * PIXELS_PER_LONGITUDE_DEGREE) * TILE_SIZE;
    let e = (lat * (PI / 180.0)).sin().clamp(-SIN_LAT_LIMIT, SIN_LAT_LIMIT);
    let global_y = (BITMAP_ORIGIN
        + 0.5 * ((1.0 + e) / (1.0 - e)).ln() * NEGATIVE_PIXELS_PER_LONGITUDE_RADIAN)
        * TILE_SIZE;
    (global_x, global_y)
}

/// Project a coordinate onto the (possibly resized) map surface.
pub fn project(lat: f64, lon: f64, geometry: &ViewportGeometry) -> ScreenPoint {
    let (global_x, global_y) = global_pixel(lat, lon);
    let raw_x = global_x * geometry.scale - geometry.x_corrector;
    let raw_y = global_y * geometry.scale - geometry.y_corrector;
    ScreenPoint {
        x: raw_x * geometry.x_map_scale,
        y: raw_y * geometry.y_map_scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn reference_map_constants() {
        let g = ViewportGeometry::native(720, 440);
        assert!((g.scale - 0.169).abs() < EPS);
        assert!((g.x_corrector - 1.1).abs() < EPS);
        assert!((g.y_corrector - 70.0).abs() < EPS);
        assert_eq!(g.x_map_scale, 1.0);
        assert_eq!(g.y_map_scale, 1.0);
    }

    #[test]
    fn origin_golden_value() {
        let g = ViewportGeometry::native(720, 440);
        let p = project(0.0, 0.0, &g);
        // 2048 * 0.169 - 1.1 and 2048 * 0.169 - 70
        assert!((p.x - 345.012).abs() < EPS, "x = {}", p.x);
        assert!((p.y - 276.112).abs() < EPS, "y = {}", p.y);
    }

    #[test]
    fn display_scaling_applies_after_correction() {
        let native = project(10.0, 20.0, &ViewportGeometry::native(720, 440));
        let doubled = project(10.0, 20.0, &ViewportGeometry::new(720, 440, 1440, 220));
        assert!((doubled.x - native.x * 2.0).abs() < EPS);
        assert!((doubled.y - native.y * 0.5).abs() < EPS);
    }

    #[test]
    fn corrector_scales_with_map_width() {
        let g = ViewportGeometry::native(1440, 880);
        assert!((g.scale - 0.338).abs() < EPS);
        assert!((g.x_corrector - 2.2).abs() < EPS);
        assert!((g.y_corrector - 140.0).abs() < EPS);
    }

    #[test]
    fn poles_are_clamped_and_finite() {
        let g = ViewportGeometry::native(720, 440);
        let north = project(90.0, 0.0, &g);
        let south = project(-90.0, 0.0, &g);
        assert!(north.y.is_finite() && south.y.is_finite());
        assert!(north.y < south.y);
        // Beyond the clamp everything lands on the same row
        assert_eq!(project(89.9, 0.0, &g).y, north.y);
    }

    #[test]
    fn projection_is_continuous() {
        let g = ViewportGeometry::new(720, 440, 200, 100);
        let mut lat = -80.0;
        while lat < 80.0 {
            let mut lon = -179.0;
            while lon < 179.0 {
                let a = project(lat, lon, &g);
                let b = project(lat + 0.01, lon + 0.01, &g);
                assert!((a.x - b.x).abs() < 0.05, "x jump at {lat},{lon}");
                assert!((a.y - b.y).abs() < 0.05, "y jump at {lat},{lon}");
                lon += 7.0;
            }
            lat += 5.0;
        }
    }

    #[test]
    fn north_is_up_and_east_is_right() {
        let g = ViewportGeometry::native(720, 440);
        let london = project(51.5, -0.1, &g);
        let cape_town = project(-33.9, 18.4, &g);
        assert!(london.y < cape_town.y);
        assert!(london.x < cape_town.x);
    }

    #[test]
    fn zero_sized_map_does_not_divide_by_zero() {
        let g = ViewportGeometry::new(0, 0, 100, 100);
        let p = project(0.0, 0.0, &g);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
    }
}
