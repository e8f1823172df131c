//! Pixel canvas the view paints into before it reaches the terminal

use crate::renderer::{Canvas, PixelRect, Rect};
use crate::terminal::{rgb, Terminal};
use image::{Rgba, RgbaImage};

/// Pixels below this alpha are treated as transparent
const ALPHA_THRESHOLD: u8 = 128;

/// Text placed on the canvas, kept in pixel coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

pub struct FrameBuffer {
    pixels: RgbaImage,
    texts: Vec<TextOverlay>,
    text_color: Rgba<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, text_color: Rgba<u8>) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            texts: Vec::new(),
            text_color,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::new(width, height);
        self.texts.clear();
    }

    pub fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 255]);
        }
        self.texts.clear();
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy pixels and text into the terminal buffer (2 pixel rows per cell).
    /// Text goes on the cell row through the middle of its line box.
    pub fn present_to(&self, term: &mut Terminal) {
        term.blit_pixels(&self.pixels);
        let c = self.text_color;
        for overlay in &self.texts {
            let col = overlay.x.round() as i32;
            let row = ((overlay.y + overlay.height / 2.0) / 2.0).floor() as i32;
            term.set_str(col, row, &overlay.text, Some(rgb(c[0], c[1], c[2])), true);
        }
    }
}

impl Canvas for FrameBuffer {
    /// Nearest-neighbour scaled copy of `src` into `dst`
    fn draw_image(&mut self, image: &RgbaImage, src: PixelRect, dst: Rect) {
        let dst_w = dst.width();
        let dst_h = dst.height();
        let src_w = src.right.saturating_sub(src.left);
        let src_h = src.bottom.saturating_sub(src.top);
        if dst_w <= 0.0 || dst_h <= 0.0 || src_w == 0 || src_h == 0 {
            return;
        }

        let (w, h) = self.pixels.dimensions();
        let x0 = dst.left.floor().max(0.0) as u32;
        let y0 = dst.top.floor().max(0.0) as u32;
        let x1 = (dst.right.ceil().max(0.0) as u32).min(w);
        let y1 = (dst.bottom.ceil().max(0.0) as u32).min(h);

        for y in y0..y1 {
            let v = ((y as f32 + 0.5 - dst.top) / dst_h).clamp(0.0, 0.9999);
            let sy = src.top + (v * src_h as f32) as u32;
            for x in x0..x1 {
                let u = ((x as f32 + 0.5 - dst.left) / dst_w).clamp(0.0, 0.9999);
                let sx = src.left + (u * src_w as f32) as u32;
                if sx >= image.width() || sy >= image.height() {
                    continue;
                }
                let px = *image.get_pixel(sx, sy);
                if px[3] >= ALPHA_THRESHOLD {
                    self.pixels.put_pixel(x, y, Rgba([px[0], px[1], px[2], 255]));
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, height: f32) {
        self.texts.push(TextOverlay {
            text: text.to_string(),
            x,
            y,
            height,
        });
    }
}
