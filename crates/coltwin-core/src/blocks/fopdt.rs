//! First-order-plus-dead-time process block.

use std::collections::VecDeque;

/// Deviation-form first-order lag with pure transport delay.
///
/// The steady-state map is `y_ss = y0 + K * (u(t - theta) - u0) + d`, so at
/// the anchor input `u0` the block settles exactly at `y0` for any gain.
///
/// # Example
///
/// ```ignore
/// // Gain 0.8, tau 40 s, dead time 10 s, dt 1 s, anchored at (120, 35).
/// let mut block = FopdtBlock::new(0.8, 40.0, 10.0, 1.0, 120.0, 35.0);
/// let y = block.update(40.0, 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FopdtBlock {
    gain: f64,
    tau: f64,
    dt: f64,
    y0: f64,
    u0: f64,
    /// Past inputs, oldest at the front; length is `delay_steps + 1`.
    delay_line: VecDeque<f64>,
    y: f64,
}

impl FopdtBlock {
    /// Create a block with the given constants and anchor point.
    ///
    /// # Panics
    ///
    /// Panics if `tau <= 0`, `theta < 0` or `dt <= 0`.
    pub fn new(gain: f64, tau: f64, theta: f64, dt: f64, y0: f64, u0: f64) -> Self {
        assert!(tau > 0.0, "tau must be positive");
        assert!(theta >= 0.0, "dead time must be non-negative");
        assert!(dt > 0.0, "dt must be positive");

        let delay_steps = (theta / dt).round() as usize;
        let mut delay_line = VecDeque::with_capacity(delay_steps + 1);
        delay_line.extend(std::iter::repeat(u0).take(delay_steps + 1));

        Self {
            gain,
            tau,
            dt,
            y0,
            u0,
            delay_line,
            y: y0,
        }
    }

    /// Current output.
    pub fn output(&self) -> f64 {
        self.y
    }

    /// Anchor point `(y0, u0)`.
    pub fn anchor(&self) -> (f64, f64) {
        (self.y0, self.u0)
    }

    /// Push input `u` and additive disturbance `d`, advance one step, return
    /// the new output.
    pub fn update(&mut self, u: f64, d: f64) -> f64 {
        self.delay_line.push_back(u);
        // The line always holds delay_steps+1 samples, so the front exists.
        let u_del = self.delay_line.pop_front().unwrap_or(self.u0);

        let y_ss = self.y0 + self.gain * (u_del - self.u0) + d;
        self.y += (y_ss - self.y) * (self.dt / self.tau);
        self.y
    }

    /// Re-initialize at the anchor, optionally rebinding it first. The delay
    /// line is refilled with the (possibly new) anchor input.
    pub fn reset(&mut self, y0: Option<f64>, u0: Option<f64>) {
        if let Some(y0) = y0 {
            self.y0 = y0;
        }
        if let Some(u0) = u0 {
            self.u0 = u0;
        }
        for slot in self.delay_line.iter_mut() {
            *slot = self.u0;
        }
        self.y = self.y0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn holds_anchor_at_steady_input() {
        let mut block = FopdtBlock::new(1.7, 30.0, 10.0, 1.0, 95.0, 40.0);

        // Holding u = u0 with no disturbance must leave y at y0 regardless
        // of the gain.
        for _ in 0..500 {
            block.update(40.0, 0.0);
        }
        assert_relative_eq!(block.output(), 95.0, epsilon = 1e-9);
    }

    #[test]
    fn step_response_reaches_dc_gain() {
        let mut block = FopdtBlock::new(0.8, 20.0, 5.0, 1.0, 120.0, 35.0);

        // +10 step on u: final value is y0 + K * 10.
        for _ in 0..1000 {
            block.update(45.0, 0.0);
        }
        assert_relative_eq!(block.output(), 128.0, epsilon = 1e-6);
    }

    #[test]
    fn dead_time_delays_the_response() {
        let theta = 10.0;
        let mut block = FopdtBlock::new(1.0, 5.0, theta, 1.0, 0.0, 0.0);

        // Output must not move while the step is still inside the delay line.
        for i in 0..10 {
            block.update(1.0, 0.0);
            assert_eq!(block.output(), 0.0, "moved early at step {i}");
        }
        block.update(1.0, 0.0);
        assert!(block.output() > 0.0);
    }

    #[test]
    fn disturbance_is_additive_on_the_output_path() {
        let mut block = FopdtBlock::new(1.0, 10.0, 0.0, 1.0, 50.0, 50.0);
        for _ in 0..500 {
            block.update(50.0, 3.0);
        }
        assert_relative_eq!(block.output(), 53.0, epsilon = 1e-6);
    }

    #[test]
    fn reset_rebinds_anchor_and_refills_delay_line() {
        let mut block = FopdtBlock::new(2.0, 10.0, 4.0, 1.0, 10.0, 5.0);
        for _ in 0..50 {
            block.update(9.0, 0.0);
        }
        block.reset(Some(20.0), Some(7.0));
        assert_eq!(block.output(), 20.0);

        // After reset the line holds u0 everywhere, so holding u0 keeps y0.
        for _ in 0..200 {
            block.update(7.0, 0.0);
        }
        assert_relative_eq!(block.output(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_dead_time_uses_current_input() {
        let mut block = FopdtBlock::new(1.0, 1.0, 0.0, 1.0, 0.0, 0.0);
        // dt == tau drives y straight to y_ss in one step.
        block.update(4.0, 0.0);
        assert_relative_eq!(block.output(), 4.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "tau must be positive")]
    fn rejects_non_positive_tau() {
        FopdtBlock::new(1.0, 0.0, 1.0, 1.0, 0.0, 0.0);
    }
}
