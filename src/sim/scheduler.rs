//! Fixed-timestep scheduler
//!
//! Decouples wall-clock frame delivery from simulation stepping. The host
//! calls [`FixedStep::advance`] once per animation frame with its clock; the
//! returned count is how many ticks to run before rendering. Slow motion is a
//! time-scale on accumulation, not a change to the step size.

use crate::consts::{MAX_BACKLOG_MS, STEP_MS};

#[derive(Debug, Clone)]
pub struct FixedStep {
    accumulator_ms: f32,
    last_time_ms: Option<f64>,
    /// Simulation speed multiplier; 1.0 = real time
    time_scale: f32,
    /// Cleared on teardown; advance becomes a no-op
    running: bool,
}

impl FixedStep {
    pub fn new() -> Self {
        Self {
            accumulator_ms: 0.0,
            last_time_ms: None,
            time_scale: 1.0,
            running: true,
        }
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the loop. Any advance after this returns zero ticks, so no tick
    /// can execute past teardown.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Feed the host clock and get the number of fixed steps to simulate.
    ///
    /// Backlog is clamped to [`MAX_BACKLOG_MS`] so a stalled tab produces a
    /// couple of catch-up ticks instead of a teleport.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }

        let last = match self.last_time_ms {
            Some(t) => t,
            None => {
                self.last_time_ms = Some(now_ms);
                return 0;
            }
        };
        let delta = (now_ms - last).max(0.0) as f32;
        self.last_time_ms = Some(now_ms);

        self.accumulator_ms += delta * self.time_scale;
        if self.accumulator_ms > MAX_BACKLOG_MS {
            log::debug!(
                "clamping {:.1} ms of simulation backlog",
                self.accumulator_ms
            );
            self.accumulator_ms = MAX_BACKLOG_MS;
        }

        let mut steps = 0;
        while self.accumulator_ms >= STEP_MS {
            self.accumulator_ms -= STEP_MS;
            steps += 1;
        }
        steps
    }
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_60hz_yields_one_step_per_frame() {
        let mut sched = FixedStep::new();
        assert_eq!(sched.advance(0.0), 0);
        let mut total = 0;
        for frame in 1..=60 {
            total += sched.advance(frame as f64 * STEP_MS as f64);
        }
        assert_eq!(total, 60);
    }

    #[test]
    fn stall_is_clamped_to_backlog() {
        let mut sched = FixedStep::new();
        sched.advance(0.0);
        // A 2-second stall must not produce 120 catch-up ticks
        let steps = sched.advance(2000.0);
        assert!(steps <= (MAX_BACKLOG_MS / STEP_MS) as u32 + 1);
        assert!(steps >= 1);
    }

    #[test]
    fn slow_motion_reduces_step_rate() {
        let mut sched = FixedStep::new();
        sched.set_time_scale(0.2);
        sched.advance(0.0);
        let mut total = 0;
        for frame in 1..=100 {
            total += sched.advance(frame as f64 * STEP_MS as f64);
        }
        // 100 frames at 0.2x should simulate ~20 ticks
        assert!((15..=25).contains(&total), "got {total}");
    }

    #[test]
    fn stop_prevents_further_steps() {
        let mut sched = FixedStep::new();
        sched.advance(0.0);
        sched.advance(100.0);
        sched.stop();
        assert_eq!(sched.advance(200.0), 0);
        assert_eq!(sched.advance(10_000.0), 0);
    }
}
