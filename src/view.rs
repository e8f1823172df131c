//! The air traffic view: map, hits and animation clock in one place.

use crate::frame_clock::FrameClock;
use crate::hit::{Hit, HitSnapshot};
use crate::map::MapAsset;
use crate::projector::ViewportGeometry;
use crate::renderer::{self, Canvas, Label, Scene, MAP_LABEL};
use crate::resources::{AttachedResources, ResourceProvider};
use crate::scheduler::Scheduler;
use image::RgbaImage;
use std::rc::Rc;

/// Geometry and fitted map for the current display size
struct Viewport {
    geometry: ViewportGeometry,
    fitted_map: RgbaImage,
}

pub struct AirTrafficView<M: MapAsset, S: Scheduler> {
    map: M,
    viewport: Option<Viewport>,
    label: Option<Label>,
    resources: Option<AttachedResources>,
    hits: HitSnapshot,
    clock: FrameClock<S>,
    frames_drawn: u64,
}

impl<M: MapAsset, S: Scheduler> AirTrafficView<M, S> {
    pub fn new(map: M, scheduler: S) -> Self {
        Self {
            map,
            viewport: None,
            label: None,
            resources: None,
            hits: Rc::from(Vec::<Hit>::new()),
            clock: FrameClock::new(scheduler),
            frames_drawn: 0,
        }
    }

    /// Set the label text height. Zero or negative hides the label.
    pub fn configure(&mut self, label_height: f32) -> &mut Self {
        self.label = (label_height > 0.0).then(|| Label::new(MAP_LABEL, label_height));
        self
    }

    pub fn attach_resource_provider(&mut self, provider: Box<dyn ResourceProvider>) -> &mut Self {
        let attached = AttachedResources::new(provider);
        tracing::debug!(metrics = ?attached.metrics, "resource provider attached");
        self.resources = Some(attached);
        self
    }

    /// Recompute geometry for a new display size and restart the animation.
    ///
    /// The current hits are dropped; the owner supplies a fresh collection.
    pub fn on_viewport_resized(&mut self, width: u32, height: u32, now_ms: i64) {
        let (map_w, map_h) = self.map.dimensions();
        let geometry = ViewportGeometry::new(map_w, map_h, width, height);
        tracing::debug!(width, height, scale = geometry.scale, "viewport resized");

        self.viewport = Some(Viewport {
            geometry,
            fitted_map: self.map.scaled(width, height),
        });
        self.hits = Rc::from(Vec::<Hit>::new());
        self.clock.start(now_ms);
    }

    /// Replace the hit collection drawn from the next frame on.
    pub fn set_events(&mut self, hits: HitSnapshot) -> &mut Self {
        self.hits = hits;
        self
    }

    /// Draw one frame onto `canvas`. Returns the number of draw operations.
    ///
    /// Nothing is drawn until the first resize has established geometry.
    pub fn render_frame(&mut self, canvas: &mut impl Canvas, now_ms: i64) -> usize {
        let hits = Rc::clone(&self.hits);
        let drawn = match &self.viewport {
            Some(viewport) => {
                let scene = Scene {
                    map: &viewport.fitted_map,
                    geometry: &viewport.geometry,
                    label: self.label.as_ref(),
                    resources: self.resources.as_ref(),
                };
                let ops = renderer::render_frame(&scene, &hits, now_ms);
                renderer::paint(&ops, canvas);
                ops.len()
            }
            None => 0,
        };

        self.frames_drawn += 1;
        self.clock.record_frame(now_ms);
        drawn
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn is_paused(&self) -> bool {
        !self.clock.is_running()
    }

    /// Request a redraw outside the animation cadence.
    pub fn on_tick(&self) {
        self.clock.on_tick();
    }

    pub fn take_redraw_request(&self) -> bool {
        self.clock.take_redraw_request()
    }

    #[cfg(test)]
    pub fn geometry(&self) -> Option<&ViewportGeometry> {
        self.viewport.as_ref().map(|v| &v.geometry)
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn fps(&self) -> f32 {
        self.clock.fps()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn clock(&self) -> &FrameClock<S> {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock<S> {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::MapTheme;
    use crate::frame_clock::test_support::ManualScheduler;
    use crate::map::WorldMap;
    use crate::renderer::{PixelRect, Rect};
    use crate::resources::PaletteResources;

    #[derive(Default)]
    struct CountingCanvas {
        images: usize,
        texts: usize,
    }

    impl Canvas for CountingCanvas {
        fn draw_image(&mut self, _: &RgbaImage, _: PixelRect, _: Rect) {
            self.images += 1;
        }

        fn draw_text(&mut self, _: &str, _: f32, _: f32, _: f32) {
            self.texts += 1;
        }
    }

    fn view() -> AirTrafficView<WorldMap, ManualScheduler> {
        let mut view = AirTrafficView::new(
            WorldMap::from_image(RgbaImage::new(720, 440)),
            ManualScheduler::default(),
        );
        let sites = vec!["web".to_string()];
        view.configure(2.0)
            .attach_resource_provider(Box::new(PaletteResources::new(&sites, 6, 18)));
        view
    }

    /// Host loop step: deliver a tick if running, draw if asked to
    fn step(view: &mut AirTrafficView<WorldMap, ManualScheduler>, canvas: &mut CountingCanvas, now: i64) {
        view.clock_mut().scheduler_mut().fire();
        if view.take_redraw_request() {
            view.render_frame(canvas, now);
        }
    }

    #[test]
    fn draw_before_resize_is_a_no_op() {
        let mut view = view();
        let mut canvas = CountingCanvas::default();
        view.set_events(Rc::from(vec![Hit::new("web", 0.0, 0.0, 0)]));
        assert_eq!(view.render_frame(&mut canvas, 0), 0);
        assert_eq!(canvas.images + canvas.texts, 0);
    }

    #[test]
    fn resize_twice_is_idempotent() {
        let mut view = view();
        view.on_viewport_resized(160, 96, 0);
        let first = *view.geometry().unwrap();
        view.on_viewport_resized(160, 96, 10);
        assert_eq!(*view.geometry().unwrap(), first);

        let sched = view.clock().scheduler();
        assert!(sched.run.is_some());
        assert_eq!(sched.starts - sched.cancels, 1);
    }

    #[test]
    fn resize_clears_hits() {
        let mut view = view();
        view.set_events(Rc::from(vec![Hit::new("web", 0.0, 0.0, 0)]));
        view.on_viewport_resized(160, 96, 0);
        assert!(view.hits().is_empty());
    }

    #[test]
    fn full_frame_draws_map_label_pin_ring() {
        let mut view = view();
        view.on_viewport_resized(160, 96, 0);
        view.set_events(Rc::from(vec![
            Hit::new("web", 10.0, 10.0, 1_000),
            Hit::new("unmapped", 10.0, 10.0, 1_000),
        ]));
        let mut canvas = CountingCanvas::default();
        assert_eq!(view.render_frame(&mut canvas, 1_100), 4);
        assert_eq!(canvas.images, 3);
        assert_eq!(canvas.texts, 1);
    }

    #[test]
    fn label_hidden_without_height() {
        let mut view = view();
        view.configure(0.0);
        view.on_viewport_resized(160, 96, 0);
        let mut canvas = CountingCanvas::default();
        view.render_frame(&mut canvas, 0);
        assert_eq!(canvas.texts, 0);
    }

    #[test]
    fn pause_stops_drawing_until_resume() {
        let mut view = view();
        let mut canvas = CountingCanvas::default();
        view.on_viewport_resized(160, 96, 0);

        for t in 0..3 {
            step(&mut view, &mut canvas, t * 16);
        }
        let before = view.frames_drawn();
        assert_eq!(before, 3);

        view.pause();
        assert!(view.is_paused());
        for t in 3..10 {
            step(&mut view, &mut canvas, t * 16);
        }
        assert_eq!(view.frames_drawn(), before);

        view.resume();
        step(&mut view, &mut canvas, 200);
        assert_eq!(view.frames_drawn(), before + 1);
    }

    #[test]
    fn snapshot_swap_mid_stream_uses_new_collection() {
        let mut view = view();
        view.on_viewport_resized(160, 96, 0);
        let mut canvas = CountingCanvas::default();

        view.set_events(Rc::from(vec![Hit::new("web", 0.0, 0.0, 0)]));
        let one = view.render_frame(&mut canvas, 10_000);
        view.set_events(Rc::from(vec![
            Hit::new("web", 0.0, 0.0, 0),
            Hit::new("web", 5.0, 5.0, 0),
        ]));
        let two = view.render_frame(&mut canvas, 10_000);
        assert_eq!(two, one + 1);
    }

    #[test]
    fn builtin_map_renders() {
        let mut view = AirTrafficView::new(WorldMap::builtin(MapTheme::Night), ManualScheduler::default());
        view.on_viewport_resized(200, 120, 0);
        let g = view.geometry().unwrap();
        assert!((g.x_map_scale - 200.0 / 720.0).abs() < 1e-12);
        assert!((g.y_map_scale - 120.0 / 440.0).abs() < 1e-12);
    }

    #[test]
    fn rendered_frames_feed_the_fps_counter() {
        let mut view = view();
        let mut canvas = CountingCanvas::default();
        view.on_viewport_resized(160, 96, 0);
        for i in 1..30 {
            view.render_frame(&mut canvas, i * 33);
        }
        view.render_frame(&mut canvas, 1_001);
        assert!((view.fps() - 30.0).abs() < 0.1, "fps = {}", view.fps());

        let before = view.fps();
        view.render_frame(&mut canvas, 500);
        assert_eq!(view.fps(), before);
    }

    #[test]
    fn direct_tick_requests_a_redraw_while_paused() {
        let mut view = view();
        view.on_viewport_resized(160, 96, 0);
        view.pause();
        assert!(!view.take_redraw_request());
        view.on_tick();
        assert!(view.take_redraw_request());
    }
}
