//! Host loops: the interactive full-screen map and one-shot print mode

use crate::config::{AirTrafficConfig, FeedSource};
use crate::feed::{DemoFeed, HitFeed, JsonLinesFeed};
use crate::framebuffer::FrameBuffer;
use crate::help::{render_help_overlay, HELP_TEXT};
use crate::hit::HitLog;
use crate::map::WorldMap;
use crate::net_geo::ConnectionFeed;
use crate::resources::PaletteResources;
use crate::scheduler::LoopScheduler;
use crate::terminal::Terminal;
use crate::view::AirTrafficView;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::style::Color;
use rand::prelude::*;
use std::io;
use std::time::{Duration, Instant};

/// Chance per loop iteration that the demo feed emits a hit
const DEMO_HIT_PROBABILITY: f64 = 0.08;

/// Used when the configured frame interval is not a usable duration
const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(30);

/// Frame interval from seconds, clamped to at least 1 ms
pub fn frame_interval(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs)
        .unwrap_or(DEFAULT_FRAME_INTERVAL)
        .max(Duration::from_millis(1))
}

/// Wall clock in epoch milliseconds, the time base of hits
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// What a key press asks the loop to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Quit,
    TogglePause,
    FrameInterval(f32),
    ToggleHelp,
    ToggleStatus,
    None,
}

/// Map a key to a loop action. Digits pick the frame interval (1 = fastest).
pub fn action_for_key(code: KeyCode, modifiers: KeyModifiers) -> Action {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('f') => Action::ToggleStatus,
        KeyCode::Char(c) => match c.to_digit(10) {
            Some(0) => Action::FrameInterval(0.2),
            Some(1) => Action::FrameInterval(0.005),
            Some(2) => Action::FrameInterval(0.01),
            Some(3) => Action::FrameInterval(0.02),
            Some(4) => Action::FrameInterval(0.03),
            Some(5) => Action::FrameInterval(0.05),
            Some(6) => Action::FrameInterval(0.07),
            Some(7) => Action::FrameInterval(0.1),
            Some(8) => Action::FrameInterval(0.15),
            Some(9) => Action::FrameInterval(0.2),
            _ => Action::None,
        },
        _ => Action::None,
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Pick the hit source; connections fall back to the demo without GeoIP data
fn open_feed(config: &AirTrafficConfig) -> io::Result<Box<dyn HitFeed>> {
    let demo = || Box::new(DemoFeed::new(seeded_rng(config.seed), DEMO_HIT_PROBABILITY)) as Box<dyn HitFeed>;
    match &config.feed {
        FeedSource::Demo => Ok(demo()),
        FeedSource::JsonLines(path) => Ok(Box::new(JsonLinesFeed::open(path)?)),
        FeedSource::Connections => {
            let feed = ConnectionFeed::new(config.geoip_db.as_deref());
            if feed.has_database() {
                Ok(Box::new(feed))
            } else {
                tracing::info!("no GeoIP database, showing demo traffic");
                Ok(demo())
            }
        }
    }
}

fn build_view(config: &AirTrafficConfig, interval: Duration) -> AirTrafficView<WorldMap, LoopScheduler> {
    let map = WorldMap::load_or_builtin(config.map.as_deref(), config.theme);
    let mut view = AirTrafficView::new(map, LoopScheduler::new(interval));
    view.configure(config.label_height)
        .attach_resource_provider(Box::new(PaletteResources::new(
            &config.sites,
            config.pin_size,
            config.ring_size,
        )));
    view
}

fn draw_status(term: &mut Terminal, fps: f32, interval: Duration, hits: usize, paused: bool) {
    let mut status = format!(" {:5.1} fps  {} ms  {} hits ", fps, interval.as_millis(), hits);
    if paused {
        status.push_str(" PAUSED ");
    }
    term.set_str(0, 0, &status, Some(Color::White), true);
}

/// Run the full-screen live map until the user quits
pub fn run(config: &AirTrafficConfig) -> io::Result<()> {
    let mut feed = open_feed(config)?;
    let mut hit_log = HitLog::new(config.retention_ms, config.max_hits);
    let mut view = build_view(config, frame_interval(config.time_step));

    let mut term = Terminal::new(true)?;
    let mut fb = FrameBuffer::new(0, 0, config.theme.label());
    let mut prev_size = (0, 0);
    let mut show_help = false;
    let mut show_status = config.show_fps;

    tracing::info!(sites = config.sites.len(), "live map started");

    loop {
        let now = now_millis();
        let size = crossterm::terminal::size().unwrap_or(term.size());
        if size != prev_size {
            term.resize(size.0, size.1);
            term.clear_screen()?;
            let (w, h) = term.pixel_size();
            fb.resize(w, h);
            view.on_viewport_resized(w, h, now);
            prev_size = size;
        }

        if let Some((code, mods)) = term.check_key()? {
            match action_for_key(code, mods) {
                Action::Quit => break,
                Action::TogglePause => {
                    if view.is_paused() {
                        view.resume();
                    } else {
                        view.pause();
                    }
                    view.on_tick();
                }
                Action::FrameInterval(secs) => {
                    view.clock_mut()
                        .scheduler_mut()
                        .set_frame_interval(frame_interval(secs));
                }
                Action::ToggleHelp => {
                    show_help = !show_help;
                    view.on_tick();
                }
                Action::ToggleStatus => {
                    show_status = !show_status;
                    view.on_tick();
                }
                Action::None => {}
            }
        }

        let new_hits = feed.poll(now);
        if !new_hits.is_empty() || !hit_log.is_empty() {
            hit_log.extend(new_hits);
            hit_log.prune(now);
            view.set_events(hit_log.snapshot());
        }

        view.clock_mut().scheduler_mut().pump(Instant::now());

        if view.take_redraw_request() {
            fb.clear();
            view.render_frame(&mut fb, now);
            fb.present_to(&mut term);
            if show_status {
                let interval = view.clock().scheduler().frame_interval();
                draw_status(&mut term, view.fps(), interval, view.hits().len(), view.is_paused());
            }
            if show_help {
                render_help_overlay(&mut term, HELP_TEXT);
            }
            term.present()?;
        }

        term.sleep(0.005);
    }

    tracing::info!(frames = view.frames_drawn(), "live map stopped");
    Ok(())
}

/// Render a single frame with `hits` demo hits and print it to stdout
pub fn print(config: &AirTrafficConfig, width: u16, height: u16, hits: usize) -> io::Result<()> {
    let mut term = Terminal::with_size(width, height, false)?;
    let (w, h) = term.pixel_size();
    let now = now_millis();

    let mut view = build_view(config, frame_interval(config.time_step));
    view.on_viewport_resized(w, h, now);

    let mut demo = DemoFeed::new(seeded_rng(config.seed), 1.0);
    let mut hit_log = HitLog::new(config.retention_ms, config.max_hits);
    hit_log.extend((0..hits).map(|_| demo.next_hit(now)));
    view.set_events(hit_log.snapshot());

    let mut fb = FrameBuffer::new(w, h, config.theme.label());
    fb.clear();
    let ops = view.render_frame(&mut fb, now);
    tracing::debug!(ops, "printed frame");

    fb.present_to(&mut term);
    term.print_to_stdout();
    Ok(())
}
