/// Fixed timestep accumulator with a frame-skip limit.
/// Converts variable frame times into a whole number of solver ticks.
#[derive(Debug, Clone)]
pub struct FixedStep {
    /// The fixed delta time per tick.
    dt: f64,
    /// Extra ticks allowed in one frame beyond the first.
    max_frame_skip: u32,
    /// Accumulated time from variable frame deltas.
    accumulator: f64,
}

/// Ticks to run for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget {
    pub steps: u32,
    /// The frame hit the skip limit and the leftover time was dropped.
    pub saturated: bool,
}

impl StepBudget {
    /// Ticks beyond the first; -1 when no tick ran this frame.
    pub fn frame_skip(&self) -> i64 {
        self.steps as i64 - 1
    }
}

impl FixedStep {
    pub fn new(dt: f64, max_frame_skip: u32) -> Self {
        Self {
            dt,
            max_frame_skip,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator and take out as many ticks as fit,
    /// up to `max_frame_skip + 1`. When the limit is reached the remaining
    /// time is discarded so the simulation does not spiral behind.
    pub fn accumulate(&mut self, frame_dt: f64) -> StepBudget {
        self.accumulator += frame_dt;
        let max_steps = self.max_frame_skip.saturating_add(1);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < max_steps {
            self.accumulator -= self.dt;
            steps += 1;
        }
        let saturated = steps == max_steps;
        if saturated {
            self.accumulator = 0.0;
        }
        StepBudget { steps, saturated }
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}
