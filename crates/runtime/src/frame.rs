use foundation::time::Time;

/// Per-frame metadata handed to every scheduled job.
///
/// Frames are driven by the display refresh callback; `time` is the callback
/// timestamp and `dt_s` the gap to the previous frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame (0 for the first frame).
    pub dt_s: f64,
    /// Timestamp at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn first(time_s: f64) -> Self {
        Self {
            index: 0,
            dt_s: 0.0,
            time: Time(time_s),
        }
    }

    /// Next frame at `time_s`. Timestamps that go backwards yield `dt_s = 0`.
    pub fn next_at(self, time_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s: (time_s - self.time.0).max(0.0),
            time: Time(time_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn fixed_step_frames_are_deterministic() {
        let a = Frame::new(10, 1.0 / 60.0);
        let b = Frame::new(10, 1.0 / 60.0);
        assert_eq!(a, b);
        assert_eq!(a.time, Time(10.0 / 60.0));
    }

    #[test]
    fn next_at_tracks_refresh_timestamps() {
        let f0 = Frame::first(1.0);
        let f1 = f0.next_at(1.016);
        assert_eq!(f1.index, 1);
        assert!((f1.dt_s - 0.016).abs() < 1e-12);

        let f2 = f1.next_at(0.5);
        assert_eq!(f2.dt_s, 0.0);
        assert_eq!(f2.index, 2);
    }
}
