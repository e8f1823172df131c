//! Per-site pin and ring bitmaps.

use crate::colors::site_color;
use image::{Rgba, RgbaImage};

/// Colour key for a known site
pub type SiteKey = usize;

/// Source of per-site images. Unknown sites have no key and are not drawn.
pub trait ResourceProvider {
    fn key_for(&self, site_id: &str) -> Option<SiteKey>;

    fn pin(&self, key: SiteKey) -> &RgbaImage;

    fn ring(&self, key: SiteKey) -> &RgbaImage;

    /// Native pin bitmap size (width, height)
    fn pin_size(&self) -> (u32, u32);

    /// Native ring bitmap size (width, height)
    fn ring_size(&self) -> (u32, u32);
}

/// Width and height in display pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// On-screen sprite sizes, fixed when a provider is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteMetrics {
    pub pin: Size,
    pub inner_ring: Size,
    pub outer_ring: Size,
}

impl SpriteMetrics {
    pub fn builder() -> SpriteMetricsBuilder {
        SpriteMetricsBuilder::default()
    }

    pub fn for_provider(provider: &dyn ResourceProvider) -> Self {
        let (pin_w, pin_h) = provider.pin_size();
        let (ring_w, ring_h) = provider.ring_size();
        Self::builder()
            .pin_size(pin_w, pin_h)
            .ring_size(ring_w, ring_h)
            .build()
    }
}

/// Derives sprite sizes from native bitmap sizes: pins draw at half size,
/// the outer ring at two thirds, the inner ring at half the outer ring.
#[derive(Default)]
pub struct SpriteMetricsBuilder {
    pin: (u32, u32),
    ring: (u32, u32),
}

impl SpriteMetricsBuilder {
    pub fn pin_size(mut self, width: u32, height: u32) -> Self {
        self.pin = (width, height);
        self
    }

    pub fn ring_size(mut self, width: u32, height: u32) -> Self {
        self.ring = (width, height);
        self
    }

    pub fn build(self) -> SpriteMetrics {
        let outer = Size::new(self.ring.0 * 2 / 3, self.ring.1 * 2 / 3);
        SpriteMetrics {
            pin: Size::new(self.pin.0 / 2, self.pin.1 / 2),
            inner_ring: Size::new(outer.width / 2, outer.height / 2),
            outer_ring: outer,
        }
    }
}

/// A provider bound to its precomputed sprite sizes
pub struct AttachedResources {
    pub provider: Box<dyn ResourceProvider>,
    pub metrics: SpriteMetrics,
}

impl AttachedResources {
    pub fn new(provider: Box<dyn ResourceProvider>) -> Self {
        let metrics = SpriteMetrics::for_provider(provider.as_ref());
        Self { provider, metrics }
    }
}

struct SiteSprites {
    pin: RgbaImage,
    ring: RgbaImage,
}

/// Generated sprites: one colour per site, in the order the sites are listed.
pub struct PaletteResources {
    sites: Vec<String>,
    sprites: Vec<SiteSprites>,
    pin_size: u32,
    ring_size: u32,
}

impl PaletteResources {
    pub fn new(sites: &[String], pin_size: u32, ring_size: u32) -> Self {
        let pin_size = pin_size.max(2);
        let ring_size = ring_size.max(3);
        let sprites = (0..sites.len())
            .map(|key| {
                let color = site_color(key);
                SiteSprites {
                    pin: disc(pin_size, color),
                    ring: ring(ring_size, color),
                }
            })
            .collect();

        Self {
            sites: sites.to_vec(),
            sprites,
            pin_size,
            ring_size,
        }
    }
}

impl ResourceProvider for PaletteResources {
    fn key_for(&self, site_id: &str) -> Option<SiteKey> {
        self.sites.iter().position(|s| s == site_id)
    }

    fn pin(&self, key: SiteKey) -> &RgbaImage {
        &self.sprites[key].pin
    }

    fn ring(&self, key: SiteKey) -> &RgbaImage {
        &self.sprites[key].ring
    }

    fn pin_size(&self) -> (u32, u32) {
        (self.pin_size, self.pin_size)
    }

    fn ring_size(&self) -> (u32, u32) {
        (self.ring_size, self.ring_size)
    }
}

/// Filled circle on a transparent square
fn disc(size: u32, color: Rgba<u8>) -> RgbaImage {
    let r = size as f32 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        if distance_from_center(x, y, r) <= r {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Circle outline about a sixth of the diameter thick
fn ring(size: u32, color: Rgba<u8>) -> RgbaImage {
    let r = size as f32 / 2.0;
    let thickness = (size as f32 / 6.0).max(1.0);
    RgbaImage::from_fn(size, size, |x, y| {
        let d = distance_from_center(x, y, r);
        if d <= r && d >= r - thickness {
            color
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn distance_from_center(x: u32, y: u32, r: f32) -> f32 {
    let dx = x as f32 + 0.5 - r;
    let dy = y as f32 + 0.5 - r;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn metrics_follow_native_sizes() {
        let m = SpriteMetrics::builder().pin_size(8, 10).ring_size(18, 30).build();
        assert_eq!(m.pin, Size::new(4, 5));
        assert_eq!(m.outer_ring, Size::new(12, 20));
        assert_eq!(m.inner_ring, Size::new(6, 10));
    }

    #[test]
    fn metrics_use_integer_division() {
        let m = SpriteMetrics::builder().pin_size(7, 7).ring_size(10, 10).build();
        assert_eq!(m.pin, Size::new(3, 3));
        assert_eq!(m.outer_ring, Size::new(6, 6));
        assert_eq!(m.inner_ring, Size::new(3, 3));
    }

    #[test]
    fn keys_follow_site_order() {
        let res = PaletteResources::new(&sites(&["web", "api"]), 6, 18);
        assert_eq!(res.key_for("web"), Some(0));
        assert_eq!(res.key_for("api"), Some(1));
        assert_eq!(res.key_for("nope"), None);
    }

    #[test]
    fn sprites_are_tinted_per_site() {
        let res = PaletteResources::new(&sites(&["web", "api"]), 6, 18);
        assert_eq!(res.pin(0).get_pixel(3, 3), &site_color(0));
        assert_eq!(res.pin(1).get_pixel(3, 3), &site_color(1));
        assert_eq!(res.pin(0).get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn ring_is_hollow() {
        let res = PaletteResources::new(&sites(&["web"]), 6, 18);
        let ring = res.ring(0);
        assert_eq!(ring.get_pixel(9, 9)[3], 0);
        assert_eq!(ring.get_pixel(9, 0)[3], 255);
    }

    #[test]
    fn attach_precomputes_metrics() {
        let attached = AttachedResources::new(Box::new(PaletteResources::new(
            &sites(&["web"]),
            6,
            18,
        )));
        assert_eq!(attached.metrics.pin, Size::new(3, 3));
        assert_eq!(attached.metrics.outer_ring, Size::new(12, 12));
    }
}
