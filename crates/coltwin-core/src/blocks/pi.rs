//! PI controller with anti-windup and bumpless re-tracking.

/// Controller action: sign convention of the error term.
///
/// Direct action drives the output up when the PV is below setpoint
/// (`e = sp - pv`); reverse action is used against negative process gains
/// (`e = pv - sp`), e.g. cooling duty or a draw valve emptying a drum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Direct,
    Reverse,
}

/// Proportional-integral controller with output saturation, back-calculation
/// anti-windup and a bumpless `track` primitive.
///
/// The control law is `u = bias + Kp * (e + I)` with `I` advanced by
/// `(dt/Ti) * e` each update and corrected by `aw * (u - u_unsat)` whenever
/// the output saturates.
///
/// # Example
///
/// ```ignore
/// let mut pi = PiController::new(1.0, 40.0, 1.0, 0.0, 100.0, 35.0, 0.8,
///                                ControlAction::Direct);
/// let u = pi.update(120.0, 118.5);
/// ```
#[derive(Debug, Clone)]
pub struct PiController {
    kp: f64,
    ti: f64,
    dt: f64,
    out_min: f64,
    out_max: f64,
    bias: f64,
    aw: f64,
    action: ControlAction,

    integral: f64,
    u_prev: f64,
}

impl PiController {
    /// Create a controller.
    ///
    /// # Panics
    ///
    /// Panics if `ti <= 0`, `dt <= 0`, `out_min >= out_max` or `aw` is
    /// outside `[0, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kp: f64,
        ti: f64,
        dt: f64,
        out_min: f64,
        out_max: f64,
        bias: f64,
        aw: f64,
        action: ControlAction,
    ) -> Self {
        assert!(ti > 0.0, "Ti must be positive");
        assert!(dt > 0.0, "dt must be positive");
        assert!(out_min < out_max, "out_min must be less than out_max");
        assert!((0.0..=1.0).contains(&aw), "aw must be in [0, 1]");

        Self {
            kp,
            ti,
            dt,
            out_min,
            out_max,
            bias,
            aw,
            action,
            integral: 0.0,
            u_prev: bias.clamp(out_min, out_max),
        }
    }

    /// Last emitted output.
    pub fn output(&self) -> f64 {
        self.u_prev
    }

    /// Integrator state.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    fn error(&self, sp: f64, pv: f64) -> f64 {
        match self.action {
            ControlAction::Direct => sp - pv,
            ControlAction::Reverse => pv - sp,
        }
    }

    /// One control update: integrate, saturate, back-calculate.
    pub fn update(&mut self, sp: f64, pv: f64) -> f64 {
        let e = self.error(sp, pv);

        self.integral += (self.dt / self.ti) * e;
        let u_unsat = self.bias + self.kp * (e + self.integral);
        let u = u_unsat.clamp(self.out_min, self.out_max);
        // Unwinds the integrator while saturated; a no-op inside the limits.
        self.integral += self.aw * (u - u_unsat);

        self.u_prev = u;
        u
    }

    /// Bumpless re-initialization onto an externally forced output.
    ///
    /// Solves for the integrator that makes the controller emit exactly
    /// `u_actual` for the current setpoint/measurement pair, so the next
    /// `update` continues from the forced command without a step.
    pub fn track(&mut self, u_actual: f64, sp: f64, pv: f64) {
        let u = u_actual.clamp(self.out_min, self.out_max);
        let e = self.error(sp, pv);

        self.integral = if self.kp.abs() < 1e-9 {
            0.0
        } else {
            (u - self.bias) / self.kp - e
        };
        self.u_prev = u;
    }

    /// Clear the integrator and rebase the output. `None` rebases at the
    /// bias.
    pub fn reset(&mut self, u0: Option<f64>) {
        self.integral = 0.0;
        self.u_prev = u0.unwrap_or(self.bias).clamp(self.out_min, self.out_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn direct_unit() -> PiController {
        PiController::new(2.0, 10.0, 1.0, 0.0, 100.0, 50.0, 0.8, ControlAction::Direct)
    }

    #[test]
    fn zero_error_holds_the_bias() {
        let mut pi = direct_unit();
        for _ in 0..20 {
            assert_eq!(pi.update(60.0, 60.0), 50.0);
        }
        assert_eq!(pi.integral(), 0.0);
    }

    #[test]
    fn proportional_step_is_kp_scaled() {
        let mut pi = direct_unit();
        // First update: e = 1, I = dt/Ti = 0.1, u = 50 + 2*(1 + 0.1).
        assert_relative_eq!(pi.update(61.0, 60.0), 52.2, epsilon = 1e-12);
    }

    #[test]
    fn reverse_action_flips_the_error_sign() {
        let mut pi =
            PiController::new(2.0, 10.0, 1.0, 0.0, 100.0, 50.0, 0.8, ControlAction::Reverse);
        // PV above SP must push a reverse controller up.
        assert!(pi.update(35.0, 40.0) > 50.0);
        // PV below SP must pull it down.
        pi.reset(None);
        assert!(pi.update(35.0, 30.0) < 50.0);
    }

    #[test]
    fn output_stays_saturated_not_wound_up() {
        let mut pi = direct_unit();
        for _ in 0..500 {
            let u = pi.update(200.0, 0.0);
            assert!(u <= 100.0 && u >= 0.0);
        }
        assert_eq!(pi.output(), 100.0);

        // Back-calculation keeps the integrator near the saturation boundary:
        // recovery must not take hundreds of steps once the error flips.
        let mut steps_to_leave = 0;
        for _ in 0..50 {
            steps_to_leave += 1;
            if pi.update(0.0, 200.0) < 100.0 {
                break;
            }
        }
        assert!(steps_to_leave < 10, "integrator wound up: {steps_to_leave}");
    }

    #[test]
    fn track_then_update_is_bumpless_at_zero_error() {
        let mut pi = direct_unit();
        pi.update(80.0, 20.0);
        pi.track(33.0, 60.0, 60.0);
        assert_eq!(pi.output(), 33.0);
        assert_relative_eq!(pi.update(60.0, 60.0), 33.0, epsilon = 1e-12);
    }

    #[test]
    fn track_drift_is_one_integrator_step() {
        let mut pi = direct_unit();
        let (sp, pv) = (62.0, 60.0);
        pi.track(40.0, sp, pv);
        // Drift after one update is exactly Kp * (dt/Ti) * e.
        let e = sp - pv;
        let expected = 40.0 + 2.0 * (1.0 / 10.0) * e;
        assert_relative_eq!(pi.update(sp, pv), expected, epsilon = 1e-12);
    }

    #[test]
    fn track_clamps_the_forced_output() {
        let mut pi = direct_unit();
        pi.track(250.0, 60.0, 60.0);
        assert_eq!(pi.output(), 100.0);
    }

    #[test]
    fn track_with_tiny_gain_zeroes_the_integrator() {
        let mut pi =
            PiController::new(0.0, 10.0, 1.0, 0.0, 100.0, 50.0, 0.8, ControlAction::Direct);
        pi.track(70.0, 60.0, 55.0);
        assert_eq!(pi.integral(), 0.0);
        assert_eq!(pi.output(), 70.0);
    }

    #[test]
    fn reset_rebases_and_clamps() {
        let mut pi = direct_unit();
        pi.update(80.0, 20.0);
        pi.reset(Some(140.0));
        assert_eq!(pi.integral(), 0.0);
        assert_eq!(pi.output(), 100.0);
        pi.reset(None);
        assert_eq!(pi.output(), 50.0);
    }

    #[test]
    #[should_panic(expected = "Ti must be positive")]
    fn rejects_non_positive_ti() {
        PiController::new(1.0, 0.0, 1.0, 0.0, 100.0, 50.0, 0.8, ControlAction::Direct);
    }
}
