//! Animation clock: redraw requests plus realized frame-rate tracking.

use crate::scheduler::{IntervalPolicy, Scheduler};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

/// Length of one animation cycle
pub const ANIMATION_CYCLE: Duration = Duration::from_millis(3000);

/// Width of the fps sampling window
const FPS_WINDOW_MS: i64 = 1000;

/// Counts frames and turns them into an fps figure once per window.
///
/// The window opens at `reset`, or at the first recorded frame if the counter
/// was never reset.
#[derive(Debug, Default)]
pub struct FpsCounter {
    window_start: Option<i64>,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn reset(&mut self, now_ms: i64) {
        self.window_start = Some(now_ms);
        self.frames = 0;
    }

    /// Count one completed frame. Returns the new fps when a window closes.
    ///
    /// A clock that moved backwards re-anchors the window and the sample is
    /// dropped without touching the frame count or the last fps.
    pub fn record(&mut self, now_ms: i64) -> Option<f32> {
        let Some(window_start) = self.window_start else {
            self.window_start = Some(now_ms);
            self.frames = 1;
            return None;
        };

        let elapsed = now_ms.saturating_sub(window_start);
        if elapsed < 0 {
            tracing::debug!(elapsed, "clock moved backwards, fps sample skipped");
            self.window_start = Some(now_ms);
            return None;
        }

        self.frames += 1;
        if elapsed <= FPS_WINDOW_MS {
            return None;
        }

        let secs = elapsed as f32 / 1000.0;
        self.fps = self.frames as f32 / secs;
        tracing::debug!(target: "airtraffic::fps", fps = self.fps, frames = self.frames, "fps = {:.1}", self.fps);
        self.window_start = Some(now_ms);
        self.frames = 0;
        Some(self.fps)
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[cfg(test)]
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

/// Shared redraw request. Scheduler ticks and direct `on_tick` calls both
/// raise it; the host lowers it when it draws.
#[derive(Clone, Debug, Default)]
pub struct RedrawSignal(Rc<Cell<bool>>);

impl RedrawSignal {
    /// One animation step: request a redraw.
    pub fn on_tick(&self) {
        self.0.set(true);
    }

    /// Consume a pending request.
    pub fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// Drives redraws through a host scheduler and measures the result.
///
/// Ticks only raise a redraw flag; the host decides when to actually draw and
/// reports each finished frame through `record_frame`.
pub struct FrameClock<S: Scheduler> {
    scheduler: S,
    policy: IntervalPolicy,
    redraw: RedrawSignal,
    fps: FpsCounter,
}

impl<S: Scheduler> FrameClock<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            policy: IntervalPolicy::forever(ANIMATION_CYCLE),
            redraw: RedrawSignal::default(),
            fps: FpsCounter::default(),
        }
    }

    /// (Re)start the animation. A run already in progress is cancelled first
    /// so there is never more than one.
    pub fn start(&mut self, now_ms: i64) {
        self.scheduler.cancel();
        self.fps.reset(now_ms);
        self.attach();
    }

    /// Detach from the scheduler. Policy and fps state are kept.
    pub fn pause(&mut self) {
        self.scheduler.cancel();
    }

    /// Reattach after `pause`. No-op while running.
    pub fn resume(&mut self) {
        if !self.scheduler.is_running() {
            self.attach();
        }
    }

    fn attach(&mut self) {
        let redraw = self.redraw.clone();
        self.scheduler
            .start(self.policy, Box::new(move |_fraction| redraw.on_tick()));
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn on_tick(&self) {
        self.redraw.on_tick();
    }

    pub fn take_redraw_request(&self) -> bool {
        self.redraw.take()
    }

    pub fn record_frame(&mut self, now_ms: i64) -> Option<f32> {
        self.fps.record(now_ms)
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ManualScheduler;
    use super::*;

    #[test]
    fn thirty_frames_over_one_second() {
        let mut fps = FpsCounter::default();
        fps.reset(0);
        for i in 1..30 {
            assert_eq!(fps.record(i * 33), None);
        }
        let sample = fps.record(1001).expect("window should close");
        assert!((sample - 30.0).abs() < 0.1, "fps = {sample}");
        assert_eq!(fps.frames(), 0);
    }

    #[test]
    fn window_must_exceed_one_second() {
        let mut fps = FpsCounter::default();
        fps.reset(0);
        assert_eq!(fps.record(1000), None);
        assert_eq!(fps.frames(), 1);
        assert!(fps.record(1001).is_some());
    }

    #[test]
    fn backwards_clock_leaves_state_untouched() {
        let mut fps = FpsCounter::default();
        fps.reset(10_000);
        fps.record(10_100);
        fps.record(11_200);
        let before = (fps.fps(), fps.frames());
        fps.record(11_300);
        let frames = fps.frames();

        assert_eq!(fps.record(5_000), None);
        assert_eq!(fps.frames(), frames);
        assert_eq!(fps.fps(), before.0);
        assert!(fps.fps().is_finite() && fps.fps() >= 0.0);
    }

    #[test]
    fn start_twice_leaves_single_run() {
        let mut clock = FrameClock::new(ManualScheduler::default());
        clock.start(0);
        clock.start(0);
        assert!(clock.is_running());
        assert_eq!(clock.scheduler().starts, 2);
        assert_eq!(clock.scheduler().cancels, 1);
    }

    #[test]
    fn tick_requests_one_redraw() {
        let mut clock = FrameClock::new(ManualScheduler::default());
        clock.start(0);
        assert!(!clock.take_redraw_request());
        clock.scheduler_mut().fire();
        assert!(clock.take_redraw_request());
        assert!(!clock.take_redraw_request());
    }

    #[test]
    fn pause_then_resume_keeps_policy() {
        let mut clock = FrameClock::new(ManualScheduler::default());
        clock.start(0);
        clock.pause();
        assert!(!clock.is_running());
        assert!(!clock.scheduler_mut().fire());
        assert!(!clock.take_redraw_request());

        clock.resume();
        let (policy, _) = clock.scheduler().run.as_ref().unwrap();
        assert_eq!(*policy, IntervalPolicy::forever(ANIMATION_CYCLE));
    }

    #[test]
    fn resume_while_running_does_not_restart() {
        let mut clock = FrameClock::new(ManualScheduler::default());
        clock.start(0);
        clock.resume();
        assert_eq!(clock.scheduler().starts, 1);
    }

    #[test]
    fn first_frame_without_reset_opens_the_window() {
        let mut fps = FpsCounter::default();
        assert_eq!(fps.record(1_700_000_000_000), None);
        assert_eq!(fps.fps(), 0.0);
        assert_eq!(fps.frames(), 1);
        assert_eq!(fps.record(1_700_000_000_500), None);
        assert!(fps.record(1_700_000_001_001).is_some());
    }

    #[test]
    fn scheduler_ticks_and_direct_ticks_share_one_request() {
        let mut clock = FrameClock::new(ManualScheduler::default());
        clock.start(0);
        clock.on_tick();
        clock.scheduler_mut().fire();
        assert!(clock.take_redraw_request());
        assert!(!clock.take_redraw_request());
    }
}
