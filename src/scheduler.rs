//! Periodic tick scheduling, independent of any GUI toolkit.
//!
//! The animation runs as a repeating cycle; every step the scheduler invokes
//! the tick callback with the fraction of the current cycle that has elapsed.

use std::time::{Duration, Instant};

/// Cycle length of a running animation. Cycles repeat until cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalPolicy {
    pub cycle: Duration,
}

impl IntervalPolicy {
    pub fn forever(cycle: Duration) -> Self {
        Self { cycle }
    }
}

/// Tick callback; receives the elapsed fraction (0.0..1.0) of the cycle
pub type TickFn = Box<dyn FnMut(f32)>;

/// Host facility that drives a repeating tick callback.
pub trait Scheduler {
    /// Begin emitting ticks. Any previous run is replaced.
    fn start(&mut self, policy: IntervalPolicy, on_tick: TickFn);

    /// Stop emitting ticks and drop the callback.
    fn cancel(&mut self);

    fn is_running(&self) -> bool;
}

struct Run {
    policy: IntervalPolicy,
    on_tick: TickFn,
    started: Instant,
    last_tick: Option<Instant>,
}

/// Scheduler pumped from the host's main loop.
///
/// Each `pump` fires at most one tick, and only once `frame_interval` has
/// passed since the previous one. Redraw cadence therefore follows the loop,
/// not timer precision.
pub struct LoopScheduler {
    frame_interval: Duration,
    run: Option<Run>,
}

impl LoopScheduler {
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            frame_interval,
            run: None,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn set_frame_interval(&mut self, frame_interval: Duration) {
        self.frame_interval = frame_interval;
    }

    /// Fire the tick callback if one is due. Returns true if it fired.
    pub fn pump(&mut self, now: Instant) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        if let Some(last) = run.last_tick {
            if now.saturating_duration_since(last) < self.frame_interval {
                return false;
            }
        }

        let elapsed = now.saturating_duration_since(run.started);
        let cycle_ms = run.policy.cycle.as_millis().max(1);
        let elapsed_ms = elapsed.as_millis();
        let fraction = (elapsed_ms % cycle_ms) as f32 / cycle_ms as f32;
        run.last_tick = Some(now);
        (run.on_tick)(fraction);
        true
    }
}

impl Scheduler for LoopScheduler {
    fn start(&mut self, policy: IntervalPolicy, on_tick: TickFn) {
        self.run = Some(Run {
            policy,
            on_tick,
            started: Instant::now(),
            last_tick: None,
        });
    }

    fn cancel(&mut self) {
        self.run = None;
    }

    fn is_running(&self) -> bool {
        self.run.is_some()
    }
}
