use crate::event_bus::EventBus;
use crate::frame::Frame;
use crate::job::Job;

/// Repeating per-frame task list.
///
/// Ordering is total: `(priority, id, insertion_order)`, so a frame always runs
/// the same jobs in the same order.
#[derive(Default)]
pub struct Scheduler {
    next_order: u64,
    jobs: Vec<(u64, Job)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            next_order: 0,
            jobs: Vec::new(),
        }
    }

    pub fn add_job(&mut self, job: Job) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);
        self.jobs.push((order, job));
        self.jobs.sort_by(|(oa, a), (ob, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.id.cmp(b.id))
                .then_with(|| oa.cmp(ob))
        });
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Job ids in execution order.
    pub fn job_ids(&self) -> Vec<&'static str> {
        self.jobs.iter().map(|(_, job)| job.id).collect()
    }

    /// Run all jobs for the given frame.
    pub fn run_frame(&self, frame: Frame, bus: &mut EventBus) {
        for (_order, job) in &self.jobs {
            (job.run)(frame, bus);
        }
    }
}
