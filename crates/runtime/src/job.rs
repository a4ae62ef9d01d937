use crate::event_bus::EventBus;
use crate::frame::Frame;

/// A unit of per-frame work executed by the [`Scheduler`](crate::Scheduler).
///
/// Jobs are run in a stable order based on their `(priority, id)`.
pub struct Job {
    pub id: &'static str,
    /// Smaller values run earlier.
    pub priority: i32,
    pub run: fn(frame: Frame, bus: &mut EventBus),
}

impl Job {
    pub fn new(id: &'static str, run: fn(frame: Frame, bus: &mut EventBus)) -> Self {
        Self {
            id,
            priority: 0,
            run,
        }
    }

    pub fn with_priority(
        id: &'static str,
        priority: i32,
        run: fn(frame: Frame, bus: &mut EventBus),
    ) -> Self {
        Self { id, priority, run }
    }
}
