//! Fixed-step scheduler coupling plant, controllers, gate and interlocks.

use coltwin_types::{LoopId, Scenario, Setpoints};

use crate::blocks::{ControlAction, MeasurementNoise, PiController};
use crate::gate::{QualityGate, Route};
use crate::interlock::{ActiveSet, InterlockTable};
use crate::plant::{self, MvBundle, PlantModel};
use crate::trace::Trace;

/// MVs moved by less than this are considered untouched by the interlocks.
const RETRACK_EPS: f64 = 1e-6;

/// Owns one plant, six PI controllers, the quality gate and the interlock
/// table for the duration of a run.
///
/// The per-step phase order is fixed: disturbances and setpoint ramping,
/// plant advance, first-step bumpless init, controller updates, gate update,
/// interlock overrides, controller re-tracking, route override, event
/// emission, logging. Re-tracking after the interlocks is what keeps the
/// loops bumpless across overrides; it must use the same SP/PV pair that
/// produced the overridden command.
pub struct Scheduler {
    scenario: Scenario,
    plant: PlantModel,

    fic101: PiController,
    tic101: PiController,
    tic102: PiController,
    tic201: PiController,
    fic201: PiController,
    lic201: PiController,

    gate: QualityGate,
    interlocks: InterlockTable,

    mv: MvBundle,
    /// Ramped setpoint state, walked toward the target each step.
    sp: Setpoints,

    route_prev: Route,
    active_prev: ActiveSet,
    init_done: bool,
}

impl Scheduler {
    /// Build a scheduler with fresh state for the given scenario.
    pub fn new(scenario: &Scenario) -> Self {
        let dt = scenario.sim.dt;
        let noise = scenario
            .sim
            .noise
            .then(|| MeasurementNoise::new(scenario.sim.seed));

        let pi = |id: LoopId, bias: f64, action: ControlAction| {
            let tuning = scenario.tuning.get(id);
            PiController::new(tuning.kp, tuning.ti, dt, 0.0, 100.0, bias, 0.8, action)
        };

        let mut fic101 = pi(LoopId::Fic101, plant::U_FEED0, ControlAction::Direct);
        let mut tic101 = pi(LoopId::Tic101, plant::U_STEAM_PRE0, ControlAction::Direct);
        let mut tic102 = pi(LoopId::Tic102, plant::U_STEAM_REB0, ControlAction::Direct);
        let mut tic201 = pi(LoopId::Tic201, plant::U_CW0, ControlAction::Reverse);
        let mut fic201 = pi(LoopId::Fic201, plant::U_REFLUX0, ControlAction::Direct);
        let mut lic201 = pi(LoopId::Lic201, plant::U_DRAW0, ControlAction::Reverse);

        let init = &scenario.mv_init;
        fic101.reset(Some(init.u_feed));
        tic101.reset(Some(init.u_steam_pre));
        tic102.reset(Some(init.u_steam_reb));
        tic201.reset(Some(init.u_cw));
        fic201.reset(Some(init.u_reflux));
        lic201.reset(Some(init.u_draw));

        let mv = MvBundle::new(
            init.u_feed,
            init.u_steam_pre,
            init.u_steam_reb,
            init.u_cw,
            init.u_reflux,
            init.u_draw,
        );

        // The ramped setpoints start at the nominal operating point and walk
        // toward the scenario targets.
        let sp = Setpoints {
            f_feed: plant::F_FEED0,
            t_feed: plant::T_FEED0,
            t_reb: plant::T_REB0,
            t_cond: plant::T_COND0,
            f_reflux: 50.0,
            l_v201: plant::L0,
        };

        Self {
            plant: PlantModel::new(dt, noise),
            fic101,
            tic101,
            tic102,
            tic201,
            fic201,
            lic201,
            gate: QualityGate::new(&scenario.gate),
            interlocks: InterlockTable::new(scenario.interlocks.clone()),
            mv,
            sp,
            route_prev: Route::Recycle,
            active_prev: [false; 6],
            init_done: false,
            scenario: scenario.clone(),
        }
    }

    /// Run to completion and return the trace. The trace has exactly
    /// `sim_s/dt + 1` rows.
    pub fn run(mut self) -> Trace {
        let dt = self.scenario.sim.dt;
        let steps = (self.scenario.sim.sim_s / dt).round() as usize;
        let mut trace = Trace::with_capacity(steps + 1);

        for i in 0..=steps {
            let ti = i as f64 * dt;
            self.step(ti, dt, &mut trace);
        }
        trace
    }

    fn step(&mut self, ti: f64, dt: f64, trace: &mut Trace) {
        // Disturbance schedule.
        let dist = &self.scenario.disturbances;
        let amplitude_at = |step: Option<coltwin_types::DisturbanceStep>| {
            step.filter(|s| ti >= s.t_start)
                .map(|s| s.amplitude)
                .unwrap_or(0.0)
        };
        let d_feed_temp = amplitude_at(dist.feed_temp);
        let d_vapor_load = amplitude_at(dist.vapor_load);
        let cw_degrade = (1.0 - amplitude_at(dist.cw_degrade)).clamp(0.0, 1.0);
        let analyzer_ok = dist.analyzer_fail_at.map_or(true, |t_fail| ti < t_fail);
        self.plant
            .set_disturbances(d_feed_temp, d_vapor_load, cw_degrade, analyzer_ok);

        // Setpoint targets: base plus every step event already due. Unknown
        // event keys are ignored.
        let mut target = self.scenario.setpoints.clone();
        for ev in &self.scenario.sp_steps {
            if ti >= ev.t {
                if let Some(id) = LoopId::from_sp_key(&ev.key) {
                    *target.get_mut(id) += ev.delta;
                }
            }
        }

        // Ramp each setpoint toward its target.
        for id in LoopId::ALL {
            let rate = self.scenario.ramps.get(id);
            let current = self.sp.get(id);
            *self.sp.get_mut(id) = ramp_toward(current, target.get(id), rate, dt);
        }

        // Advance the plant with the previous MVs.
        let pv = self.plant.update(&self.mv);

        // First step: line the controllers up with the initial valve
        // positions so closed loop starts without a bump.
        if !self.init_done {
            self.fic101.track(self.mv.u_feed, self.sp.f_feed, pv.f_feed);
            self.tic101
                .track(self.mv.u_steam_pre, self.sp.t_feed, pv.t_feed_out);
            self.tic102
                .track(self.mv.u_steam_reb, self.sp.t_reb, pv.t_reb);
            self.tic201.track(self.mv.u_cw, self.sp.t_cond, pv.t_cond_out);
            self.fic201
                .track(self.mv.u_reflux, self.sp.f_reflux, pv.f_reflux);
            self.lic201.track(self.mv.u_draw, self.sp.l_v201, pv.l_v201);
            self.init_done = true;
        }

        // Controller updates.
        self.mv.u_feed = self.fic101.update(self.sp.f_feed, pv.f_feed);
        self.mv.u_steam_pre = self.tic101.update(self.sp.t_feed, pv.t_feed_out);
        self.mv.u_steam_reb = self.tic102.update(self.sp.t_reb, pv.t_reb);
        self.mv.u_cw = self.tic201.update(self.sp.t_cond, pv.t_cond_out);
        self.mv.u_reflux = self.fic201.update(self.sp.f_reflux, pv.f_reflux);
        self.mv.u_draw = self.lic201.update(self.sp.l_v201, pv.l_v201);
        let snapshot = self.mv;

        // Provisional route from the gate.
        let gate_cfg = &self.scenario.gate;
        let permissive_ok =
            pv.l_v201 > gate_cfg.perm_level_min && pv.l_v201 < gate_cfg.perm_level_max;
        let mut route = self.gate.update(
            dt,
            pv.tt106,
            pv.rho15,
            pv.dtsub(),
            pv.analyzer_ok,
            permissive_ok,
        );

        // Interlocks act on the fresh commands.
        self.mv.force_route = None;
        let active = self.interlocks.evaluate(&pv, &mut self.mv);

        // Re-track every loop whose valve the interlocks moved, with the
        // same SP/PV pair that produced the overridden command.
        if (self.mv.u_feed - snapshot.u_feed).abs() > RETRACK_EPS {
            self.fic101.track(self.mv.u_feed, self.sp.f_feed, pv.f_feed);
        }
        if (self.mv.u_steam_pre - snapshot.u_steam_pre).abs() > RETRACK_EPS {
            self.tic101
                .track(self.mv.u_steam_pre, self.sp.t_feed, pv.t_feed_out);
        }
        if (self.mv.u_steam_reb - snapshot.u_steam_reb).abs() > RETRACK_EPS {
            self.tic102
                .track(self.mv.u_steam_reb, self.sp.t_reb, pv.t_reb);
        }
        if (self.mv.u_cw - snapshot.u_cw).abs() > RETRACK_EPS {
            self.tic201.track(self.mv.u_cw, self.sp.t_cond, pv.t_cond_out);
        }
        if (self.mv.u_reflux - snapshot.u_reflux).abs() > RETRACK_EPS {
            self.fic201
                .track(self.mv.u_reflux, self.sp.f_reflux, pv.f_reflux);
        }
        if (self.mv.u_draw - snapshot.u_draw).abs() > RETRACK_EPS {
            self.lic201.track(self.mv.u_draw, self.sp.l_v201, pv.l_v201);
        }

        // A forced route wins over the gate.
        if let Some(forced) = self.mv.force_route {
            route = forced;
        }

        // Transition events.
        if route != self.route_prev {
            trace.push_event(
                ti,
                format!(
                    "GATE_SWITCH: {} -> {}",
                    self.route_prev.as_str(),
                    route.as_str()
                ),
            );
        }
        for (idx, rule) in crate::interlock::InterlockRule::ALL.iter().enumerate() {
            if active[idx] && !self.active_prev[idx] {
                trace.push_event(ti, format!("INTERLOCK_ON: {} {}", rule.id(), rule.describe()));
            } else if !active[idx] && self.active_prev[idx] {
                trace.push_event(ti, format!("INTERLOCK_OFF: {} {}", rule.id(), rule.describe()));
            }
        }
        self.route_prev = route;
        self.active_prev = active;

        trace.append(ti, &pv, &self.sp, &self.mv, route);
    }
}

/// Walk `current` toward `target` with at most `rate * dt` per step. A rate
/// that is zero, negative or non-finite jumps straight to the target.
fn ramp_toward(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    if !rate.is_finite() || rate <= 0.0 {
        return target;
    }
    let max_delta = rate * dt;
    current + (target - current).clamp(-max_delta, max_delta)
}
