//! Frame planning: what to draw, in which order, and where.
//!
//! A frame is the map at the origin, then the label, then each hit's pin and
//! optional ring. Planning is separate from painting so a frame can be
//! inspected without a surface.

use crate::decoration::{decoration_for, Decoration};
use crate::hit::Hit;
use crate::projector::{project, ScreenPoint, ViewportGeometry};
use crate::resources::{AttachedResources, Size};
use image::RgbaImage;

/// Text drawn along the bottom of the map
pub const MAP_LABEL: &str = "AirTraffic Live";

/// Monospace glyph advance as a fraction of text height
const GLYPH_ASPECT: f32 = 0.5;

/// Integer pixel rectangle in image space
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl PixelRect {
    /// Whole-image rectangle
    pub fn covering(image: &RgbaImage) -> Self {
        Self {
            left: 0,
            top: 0,
            right: image.width(),
            bottom: image.height(),
        }
    }
}

/// Destination rectangle in display pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle of `size` centred on `center`
    pub fn centered(center: ScreenPoint, size: Size) -> Self {
        let x = center.x as f32;
        let y = center.y as f32;
        let left = x - (size.width / 2) as f32;
        let top = y - (size.height / 2) as f32;
        Self {
            left,
            top,
            right: left + size.width as f32,
            bottom: top + size.height as f32,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// One drawing command. Images are borrowed for the duration of the frame.
#[derive(Clone, Copy, Debug)]
pub enum DrawOp<'a> {
    Image {
        image: &'a RgbaImage,
        src: PixelRect,
        dst: Rect,
    },
    Text {
        text: &'a str,
        x: f32,
        y: f32,
        height: f32,
    },
}

/// Drawing surface a planned frame is painted onto
pub trait Canvas {
    fn draw_image(&mut self, image: &RgbaImage, src: PixelRect, dst: Rect);

    fn draw_text(&mut self, text: &str, x: f32, y: f32, height: f32);
}

/// Label text with its measured width
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub height: f32,
    pub width: f32,
}

impl Label {
    pub fn new(text: &str, height: f32) -> Self {
        Self {
            text: text.to_string(),
            height,
            width: measure_text(text, height),
        }
    }
}

pub fn measure_text(text: &str, height: f32) -> f32 {
    text.chars().count() as f32 * height * GLYPH_ASPECT
}

/// Everything a frame is drawn from besides the hits themselves
pub struct Scene<'a> {
    /// Map already fitted to the display
    pub map: &'a RgbaImage,
    pub geometry: &'a ViewportGeometry,
    pub label: Option<&'a Label>,
    pub resources: Option<&'a AttachedResources>,
}

/// Plan one frame. `hits` is read once, front to back.
pub fn render_frame<'a>(scene: &Scene<'a>, hits: &[Hit], now: i64) -> Vec<DrawOp<'a>> {
    let mut ops = Vec::with_capacity(2 + hits.len() * 2);

    ops.push(DrawOp::Image {
        image: scene.map,
        src: PixelRect::covering(scene.map),
        dst: Rect {
            left: 0.0,
            top: 0.0,
            right: scene.map.width() as f32,
            bottom: scene.map.height() as f32,
        },
    });

    if let Some(label) = scene.label.filter(|l| l.width > 0.0) {
        ops.push(DrawOp::Text {
            text: &label.text,
            x: scene.map.width() as f32 / 2.0 - label.width / 2.0,
            y: scene.map.height() as f32 - label.height,
            height: label.height,
        });
    }

    if let Some(resources) = scene.resources {
        for hit in hits {
            plan_hit(&mut ops, resources, scene.geometry, hit, now);
        }
    }

    ops
}

fn plan_hit<'a>(
    ops: &mut Vec<DrawOp<'a>>,
    resources: &'a AttachedResources,
    geometry: &ViewportGeometry,
    hit: &Hit,
    now: i64,
) {
    let provider = resources.provider.as_ref();
    let Some(key) = provider.key_for(&hit.site_id) else {
        return;
    };

    let at = project(hit.lat, hit.lon, geometry);

    let pin = provider.pin(key);
    ops.push(DrawOp::Image {
        image: pin,
        src: PixelRect::covering(pin),
        dst: Rect::centered(at, resources.metrics.pin),
    });

    let ring_size = match decoration_for(hit.time, now) {
        Decoration::InnerRing => resources.metrics.inner_ring,
        Decoration::OuterRing => resources.metrics.outer_ring,
        Decoration::None => return,
    };
    let ring = provider.ring(key);
    ops.push(DrawOp::Image {
        image: ring,
        src: PixelRect::covering(ring),
        dst: Rect::centered(at, ring_size),
    });
}

/// Replay planned operations onto a canvas, in order.
pub fn paint(ops: &[DrawOp<'_>], canvas: &mut impl Canvas) {
    for op in ops {
        match *op {
            DrawOp::Image { image, src, dst } => canvas.draw_image(image, src, dst),
            DrawOp::Text { text, x, y, height } => canvas.draw_text(text, x, y, height),
        }
    }
}
