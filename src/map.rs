//! The pre-rendered world map the hits are drawn on

use crate::colors::MapTheme;
use crate::geo_data::CONTINENTS;
use crate::projector::{project, ViewportGeometry};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::io;
use std::path::Path;

/// Native size of the generated map
pub const BUILTIN_MAP_WIDTH: u32 = 720;
pub const BUILTIN_MAP_HEIGHT: u32 = 440;

const GRATICULE_STEP_DEG: i32 = 30;

/// A map bitmap that can be fitted to the display
pub trait MapAsset {
    /// Native (width, height) in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Copy scaled to exactly `width` x `height`
    fn scaled(&self, width: u32, height: u32) -> RgbaImage;
}

pub struct WorldMap {
    image: RgbaImage,
}

impl WorldMap {
    #[cfg(test)]
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load a map image (PNG, JPEG, ...) from disk
    pub fn open(path: &Path) -> io::Result<Self> {
        let image = image::open(path).map_err(io::Error::other)?.to_rgba8();
        tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "loaded map image");
        Ok(Self { image })
    }

    /// Load `path` if given, falling back to the generated map when it is
    /// missing or unreadable.
    pub fn load_or_builtin(path: Option<&Path>, theme: MapTheme) -> Self {
        if let Some(path) = path {
            match Self::open(path) {
                Ok(map) => return map,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "map image unusable, using built-in map");
                }
            }
        }
        Self::builtin(theme)
    }

    /// Render the built-in map: sea, graticule, then land masses placed with
    /// the same projection the pins use.
    pub fn builtin(theme: MapTheme) -> Self {
        let mut image =
            RgbaImage::from_pixel(BUILTIN_MAP_WIDTH, BUILTIN_MAP_HEIGHT, theme.sea());
        let geometry = ViewportGeometry::native(BUILTIN_MAP_WIDTH, BUILTIN_MAP_HEIGHT);

        for lon in (-180..=180).step_by(GRATICULE_STEP_DEG as usize) {
            let x = project(0.0, lon as f64, &geometry).x.round();
            if x >= 0.0 && (x as u32) < image.width() {
                for y in 0..image.height() {
                    image.put_pixel(x as u32, y, theme.grid());
                }
            }
        }
        for lat in (-60..=60).step_by(GRATICULE_STEP_DEG as usize) {
            let y = project(lat as f64, 0.0, &geometry).y.round();
            if y >= 0.0 && (y as u32) < image.height() {
                for x in 0..image.width() {
                    image.put_pixel(x, y as u32, theme.grid());
                }
            }
        }

        for (_, outline) in CONTINENTS {
            let polygon: Vec<(f64, f64)> = outline
                .iter()
                .map(|&(lat, lon)| {
                    let p = project(lat, lon, &geometry);
                    (p.x, p.y)
                })
                .collect();
            fill_polygon(&mut image, &polygon, theme.land());
        }

        Self { image }
    }

    #[cfg(test)]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl MapAsset for WorldMap {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn scaled(&self, width: u32, height: u32) -> RgbaImage {
        if (width, height) == self.image.dimensions() {
            return self.image.clone();
        }
        imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Triangle)
    }
}

/// Even-odd scanline fill, sampling each row at pixel centres
fn fill_polygon(image: &mut RgbaImage, polygon: &[(f64, f64)], color: image::Rgba<u8>) {
    if polygon.len() < 3 {
        return;
    }
    let (w, h) = image.dimensions();
    let min_y = polygon.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).max(0.0);
    let max_y = polygon
        .iter()
        .map(|p| p.1)
        .fold(f64::NEG_INFINITY, f64::max)
        .min(h as f64 - 1.0);
    if min_y > max_y {
        return;
    }

    let mut crossings: Vec<f64> = Vec::new();
    for row in (min_y.floor() as u32)..=(max_y.ceil() as u32).min(h - 1) {
        let sy = row as f64 + 0.5;
        crossings.clear();
        for i in 0..polygon.len() {
            let (x1, y1) = polygon[i];
            let (x2, y2) = polygon[(i + 1) % polygon.len()];
            if (y1 <= sy && y2 > sy) || (y2 <= sy && y1 > sy) {
                crossings.push(x1 + (sy - y1) / (y2 - y1) * (x2 - x1));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round().max(0.0) as u32;
            let end = pair[1].round().min(w as f64) as u32;
            for x in start..end {
                image.put_pixel(x, row, color);
            }
        }
    }
}
