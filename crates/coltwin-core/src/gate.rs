//! Product/recycle quality gate.

use coltwin_types::GateConfig;
use serde::{Deserialize, Serialize};

/// Where the distillate stream goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Route {
    #[default]
    Recycle,
    Product,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Recycle => "RECYCLE",
            Route::Product => "PRODUCT",
        }
    }
}

// Hysteresis widening applied to the ON thresholds to form the OFF band.
const TT106_OFF_WIDEN: f64 = 2.0;
const RHO15_OFF_WIDEN: f64 = 0.005;
const DTSUB_OFF_RELAX: f64 = 1.0;

/// Two-state hysteretic gate with dwell timers.
///
/// Promotion to PRODUCT requires the ON conditions to hold continuously for
/// `delay_on_s`; demotion requires the (wider) OFF conditions to be violated
/// continuously for `delay_off_s`. A failed analyzer or a level permissive
/// outside its window forces RECYCLE immediately and clears both timers.
#[derive(Debug, Clone)]
pub struct QualityGate {
    tt106_on: (f64, f64),
    tt106_off: (f64, f64),
    rho15_on: (f64, f64),
    rho15_off: (f64, f64),
    dtsub_min: f64,
    dtsub_min_off: f64,
    delay_on_s: f64,
    delay_off_s: f64,

    route: Route,
    on_timer: f64,
    off_timer: f64,
}

impl QualityGate {
    /// Build a gate in RECYCLE with both timers cleared. OFF thresholds are
    /// derived from the configured ON thresholds by the fixed widening.
    pub fn new(cfg: &GateConfig) -> Self {
        Self {
            tt106_on: (cfg.tt106_on_low, cfg.tt106_on_high),
            tt106_off: (
                cfg.tt106_on_low - TT106_OFF_WIDEN,
                cfg.tt106_on_high + TT106_OFF_WIDEN,
            ),
            rho15_on: (cfg.rho15_on_low, cfg.rho15_on_high),
            rho15_off: (
                cfg.rho15_on_low - RHO15_OFF_WIDEN,
                cfg.rho15_on_high + RHO15_OFF_WIDEN,
            ),
            dtsub_min: cfg.dtsub_min,
            dtsub_min_off: cfg.dtsub_min - DTSUB_OFF_RELAX,
            delay_on_s: cfg.delay_on_s,
            delay_off_s: cfg.delay_off_s,
            route: Route::Recycle,
            on_timer: 0.0,
            off_timer: 0.0,
        }
    }

    /// Current route.
    pub fn route(&self) -> Route {
        self.route
    }

    /// Advance the gate by one step and return the route.
    pub fn update(
        &mut self,
        dt: f64,
        tt106: f64,
        rho15: f64,
        dtsub: f64,
        analyzer_ok: bool,
        permissive_ok: bool,
    ) -> Route {
        if !analyzer_ok || !permissive_ok {
            self.route = Route::Recycle;
            self.on_timer = 0.0;
            self.off_timer = 0.0;
            return self.route;
        }

        let in_band = |v: f64, (lo, hi): (f64, f64)| v >= lo && v <= hi;
        let on_ok = in_band(tt106, self.tt106_on)
            && in_band(rho15, self.rho15_on)
            && dtsub >= self.dtsub_min;
        let off_bad = !in_band(tt106, self.tt106_off)
            || !in_band(rho15, self.rho15_off)
            || dtsub < self.dtsub_min_off;

        match self.route {
            Route::Recycle => {
                self.on_timer = if on_ok { self.on_timer + dt } else { 0.0 };
                if self.on_timer >= self.delay_on_s {
                    self.route = Route::Product;
                    self.on_timer = 0.0;
                    self.off_timer = 0.0;
                }
            }
            Route::Product => {
                self.off_timer = if off_bad { self.off_timer + dt } else { 0.0 };
                if self.off_timer >= self.delay_off_s {
                    self.route = Route::Recycle;
                    self.on_timer = 0.0;
                    self.off_timer = 0.0;
                }
            }
        }
        self.route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> GateConfig {
        GateConfig::default()
    }

    /// In-spec measurements: TT106 95, rho 0.74, dTsub 60.
    fn step_good(gate: &mut QualityGate, dt: f64) -> Route {
        gate.update(dt, 95.0, 0.74, 60.0, true, true)
    }

    #[test]
    fn starts_in_recycle() {
        let gate = QualityGate::new(&cfg());
        assert_eq!(gate.route(), Route::Recycle);
    }

    #[test]
    fn promotes_only_after_the_on_dwell() {
        let mut gate = QualityGate::new(&cfg());
        // delay_on is 120 s; at dt = 1 the timer reaches 120 on the 120th
        // update.
        for _ in 0..119 {
            assert_eq!(step_good(&mut gate, 1.0), Route::Recycle);
        }
        assert_eq!(step_good(&mut gate, 1.0), Route::Product);
    }

    #[test]
    fn interrupted_on_condition_restarts_the_dwell() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..100 {
            step_good(&mut gate, 1.0);
        }
        // One off-spec sample clears the accumulated dwell.
        gate.update(1.0, 90.0, 0.74, 60.0, true, true);
        for _ in 0..119 {
            assert_eq!(step_good(&mut gate, 1.0), Route::Recycle);
        }
        assert_eq!(step_good(&mut gate, 1.0), Route::Product);
    }

    #[test]
    fn hysteresis_band_does_not_demote() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..120 {
            step_good(&mut gate, 1.0);
        }
        assert_eq!(gate.route(), Route::Product);

        // TT106 at 98 is outside the ON band but inside the widened OFF
        // band, so PRODUCT holds indefinitely.
        for _ in 0..1000 {
            assert_eq!(gate.update(1.0, 98.0, 0.74, 60.0, true, true), Route::Product);
        }
    }

    #[test]
    fn demotes_after_the_off_dwell() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..120 {
            step_good(&mut gate, 1.0);
        }
        // TT106 at 100 violates the OFF band; delay_off is 30 s.
        for _ in 0..29 {
            assert_eq!(gate.update(1.0, 100.0, 0.74, 60.0, true, true), Route::Product);
        }
        assert_eq!(gate.update(1.0, 100.0, 0.74, 60.0, true, true), Route::Recycle);
    }

    #[test]
    fn analyzer_failure_forces_recycle_and_clears_timers() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..120 {
            step_good(&mut gate, 1.0);
        }
        assert_eq!(gate.route(), Route::Product);

        assert_eq!(gate.update(1.0, 95.0, 0.74, 60.0, false, true), Route::Recycle);
        // Recovery needs the full ON dwell again.
        for _ in 0..119 {
            assert_eq!(step_good(&mut gate, 1.0), Route::Recycle);
        }
        assert_eq!(step_good(&mut gate, 1.0), Route::Product);
    }

    #[test]
    fn permissive_violation_forces_recycle() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..120 {
            step_good(&mut gate, 1.0);
        }
        assert_eq!(gate.update(1.0, 95.0, 0.74, 60.0, true, false), Route::Recycle);
    }

    #[test]
    fn dtsub_uses_the_relaxed_off_threshold() {
        let mut gate = QualityGate::new(&cfg());
        for _ in 0..120 {
            step_good(&mut gate, 1.0);
        }
        // 54.5 is below dtsub_min (55) but above the OFF threshold (54).
        for _ in 0..500 {
            assert_eq!(gate.update(1.0, 95.0, 0.74, 54.5, true, true), Route::Product);
        }
        // 53.5 violates the OFF threshold.
        for _ in 0..30 {
            gate.update(1.0, 95.0, 0.74, 53.5, true, true);
        }
        assert_eq!(gate.route(), Route::Recycle);
    }
}
