use std::{collections::VecDeque, time::Duration};

const FPS_WINDOW: usize = 10;

/// Frame clock fed by the backend's measured frame time.
#[derive(Clone, Debug)]
pub struct Clock {
    max_frame: Duration,
    last_tick: Duration,
    elapsed: Duration,
    frames: u64,
    recent: VecDeque<Duration>,
}

impl Clock {
    /// Creates a clock that clamps individual frames to `max_frame`.
    #[must_use]
    pub fn new(max_frame: Duration) -> Self {
        Self {
            max_frame,
            last_tick: Duration::ZERO,
            elapsed: Duration::ZERO,
            frames: 0,
            recent: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Records a frame of `dt`, clamped to the configured maximum.
    pub fn advance(&mut self, dt: Duration) {
        let dt = dt.min(self.max_frame);
        self.last_tick = dt;
        self.elapsed = self.elapsed.saturating_add(dt);
        self.frames = self.frames.saturating_add(1);

        if self.recent.len() == FPS_WINDOW {
            let _ = self.recent.pop_front();
        }
        self.recent.push_back(dt);
    }

    /// Duration of the current frame.
    #[must_use]
    pub const fn dt(&self) -> Duration {
        self.last_tick
    }

    /// Total simulated time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Number of frames advanced so far.
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Frames per second averaged over the last ten frames.
    #[must_use]
    pub fn fps(&self) -> f32 {
        let total: Duration = self.recent.iter().sum();
        let seconds = total.as_secs_f32();
        if seconds <= f32::EPSILON {
            return 0.0;
        }
        self.recent.len() as f32 / seconds
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}
