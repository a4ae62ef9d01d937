//! Per-frame loop driven by `requestAnimationFrame`.

use std::cell::RefCell;

use gloo_render::{AnimationFrame, request_animation_frame};
use runtime::{Event, EventBus, Frame, Scheduler};

/// Runs the scheduled jobs once per display refresh.
pub struct RenderLoop {
    scheduler: Scheduler,
    bus: EventBus,
    last: Option<Frame>,
}

impl RenderLoop {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            bus: EventBus::new(),
            last: None,
        }
    }

    /// Runs every job for the refresh at `timestamp_ms` and returns the events they emitted.
    pub fn tick(&mut self, timestamp_ms: f64) -> (Frame, Vec<Event>) {
        let time_s = timestamp_ms / 1000.0;
        let frame = match self.last {
            Some(prev) => prev.next_at(time_s),
            None => Frame::first(time_s),
        };
        self.last = Some(frame);
        self.scheduler.run_frame(frame, &mut self.bus);
        (frame, self.bus.drain())
    }
}

thread_local! {
    static LOOP: RefCell<Option<RenderLoop>> = const { RefCell::new(None) };
    static NEXT: RefCell<Option<AnimationFrame>> = const { RefCell::new(None) };
}

/// Starts the loop, replacing any loop already running.
pub fn start(scheduler: Scheduler) {
    tracing::info!(jobs = ?scheduler.job_ids(), "render loop starting");
    LOOP.with(|l| *l.borrow_mut() = Some(RenderLoop::new(scheduler)));
    request_next();
}

fn request_next() {
    let handle = request_animation_frame(on_frame);
    NEXT.with(|n| *n.borrow_mut() = Some(handle));
}

fn on_frame(timestamp_ms: f64) {
    let events = LOOP.with(|l| l.borrow_mut().as_mut().map(|l| l.tick(timestamp_ms)));
    let Some((frame, events)) = events else {
        return;
    };
    for event in events {
        tracing::warn!(frame = frame.index, kind = event.kind, "{}", event.message);
    }
    request_next();
}
