//! Request -> response boundary.
//!
//! The request is sanitized into a [`Scenario`] (defaults for missing or
//! malformed fields, silent range corrections), dispatched by mode, and the
//! result packed into the wire records. Only a genuine runtime fault — a
//! non-finite signal escaping the simulation — surfaces as an error
//! response; no partial trace is ever returned.

use coltwin_types::{
    EngineRequest, EngineResponse, ErrorResponse, Mode, Scenario, SingleResponse, SuiteEntry,
};
use thiserror::Error;

use crate::metrics::{gate_stats, metric_records};
use crate::scheduler::Scheduler;
use crate::suite::run_suite_scenarios;
use crate::trace::Trace;

/// Downsampling cap for chart data.
const CHART_CAP: usize = 700;
/// Event-log truncation limit.
const MAX_EVENTS: usize = 200;

/// Engine-level faults.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation produced a non-finite {signal} sample at t = {t} s")]
    NonFiniteSignal { signal: &'static str, t: f64 },
    #[error("simulation produced an empty trace")]
    EmptyTrace,
}

/// Build the scenario a request describes. Missing, malformed or
/// out-of-range fields fall back to defaults; low/high threshold pairs are
/// swapped when inverted. These are silent normalizations, not errors.
pub fn scenario_from_request(req: &EngineRequest) -> Scenario {
    let mut sc = Scenario::default();

    sc.sim.sim_s = req.sim_s.unwrap_or(sc.sim.sim_s).clamp(600.0, 7200.0);
    sc.sim.dt = req.dt.unwrap_or(sc.sim.dt).clamp(0.5, 5.0);
    sc.sim.noise = req.noise.unwrap_or(false);
    sc.sim.seed = req.seed;

    let sp = &mut sc.setpoints;
    sp.f_feed = req.sp_Ffeed.unwrap_or(sp.f_feed);
    sp.t_feed = req.sp_Tfeed.unwrap_or(sp.t_feed);
    sp.t_reb = req.sp_Treb.unwrap_or(sp.t_reb);
    sp.t_cond = req.sp_Tcond.unwrap_or(sp.t_cond);
    sp.f_reflux = req.sp_Freflux.unwrap_or(sp.f_reflux);
    sp.l_v201 = req.sp_Lv201.unwrap_or(sp.l_v201);

    let valid_kp = |v: Option<f64>| v.filter(|kp| *kp >= 0.0);
    let valid_ti = |v: Option<f64>| v.filter(|ti| *ti > 0.0);
    let t = &mut sc.tuning;
    t.fic101.kp = valid_kp(req.kp_fic101).unwrap_or(t.fic101.kp);
    t.fic101.ti = valid_ti(req.ti_fic101).unwrap_or(t.fic101.ti);
    t.tic101.kp = valid_kp(req.kp_tic101).unwrap_or(t.tic101.kp);
    t.tic101.ti = valid_ti(req.ti_tic101).unwrap_or(t.tic101.ti);
    t.tic102.kp = valid_kp(req.kp_tic102).unwrap_or(t.tic102.kp);
    t.tic102.ti = valid_ti(req.ti_tic102).unwrap_or(t.tic102.ti);
    t.tic201.kp = valid_kp(req.kp_tic201).unwrap_or(t.tic201.kp);
    t.tic201.ti = valid_ti(req.ti_tic201).unwrap_or(t.tic201.ti);
    t.fic201.kp = valid_kp(req.kp_fic201).unwrap_or(t.fic201.kp);
    t.fic201.ti = valid_ti(req.ti_fic201).unwrap_or(t.fic201.ti);
    t.lic201.kp = valid_kp(req.kp_lic201).unwrap_or(t.lic201.kp);
    t.lic201.ti = valid_ti(req.ti_lic201).unwrap_or(t.lic201.ti);

    let g = &mut sc.gate;
    g.tt106_on_low = req.g_tt_low.unwrap_or(g.tt106_on_low);
    g.tt106_on_high = req.g_tt_high.unwrap_or(g.tt106_on_high);
    if g.tt106_on_low > g.tt106_on_high {
        std::mem::swap(&mut g.tt106_on_low, &mut g.tt106_on_high);
    }
    g.rho15_on_low = req.g_rho_low.unwrap_or(g.rho15_on_low);
    g.rho15_on_high = req.g_rho_high.unwrap_or(g.rho15_on_high);
    if g.rho15_on_low > g.rho15_on_high {
        std::mem::swap(&mut g.rho15_on_low, &mut g.rho15_on_high);
    }
    g.dtsub_min = req.g_dTsub.unwrap_or(g.dtsub_min);
    // A dwell shorter than one step would let the gate switch on the very
    // first sample.
    g.delay_on_s = req.g_delay_on.unwrap_or(g.delay_on_s).max(sc.sim.dt);
    g.delay_off_s = req.g_delay_off.unwrap_or(g.delay_off_s).max(sc.sim.dt);

    if req.analyzerFail == Some(true) {
        sc.disturbances.analyzer_fail_at = Some(1800.0);
    }

    sc
}

fn check_finite(trace: &Trace) -> Result<(), EngineError> {
    if trace.is_empty() {
        return Err(EngineError::EmptyTrace);
    }
    let columns: [(&'static str, &[f64]); 10] = [
        ("F_feed", &trace.f_feed),
        ("T_feed_out", &trace.t_feed_out),
        ("T_reb", &trace.t_reb),
        ("F_reflux", &trace.f_reflux),
        ("T_cond_out", &trace.t_cond_out),
        ("TT106", &trace.tt106),
        ("TT201", &trace.tt201),
        ("rho15", &trace.rho15),
        ("L_v201", &trace.l_v201),
        ("dTsub", &trace.dtsub),
    ];
    for (signal, col) in columns {
        if let Some(i) = col.iter().position(|v| !v.is_finite()) {
            return Err(EngineError::NonFiniteSignal {
                signal,
                t: trace.t[i],
            });
        }
    }
    Ok(())
}

/// Run one scenario and pack the single-mode response.
pub fn run_single(req: &EngineRequest) -> Result<SingleResponse, EngineError> {
    let scenario = scenario_from_request(req);
    let trace = Scheduler::new(&scenario).run();
    check_finite(&trace)?;

    let mut event_log = trace.events().to_vec();
    event_log.truncate(MAX_EVENTS);

    Ok(SingleResponse {
        chart_data: trace.chart_data(&scenario.gate, CHART_CAP),
        metrics: metric_records(&trace, &scenario.metrics),
        gate: gate_stats(trace.routes()),
        event_log,
    })
}

/// Run the full scenario suite derived from the request.
pub fn run_suite(req: &EngineRequest) -> Result<Vec<SuiteEntry>, EngineError> {
    let scenario = scenario_from_request(req);
    let entries = run_suite_scenarios(&scenario);
    for entry in &entries {
        if !entry.total_iae.is_finite() {
            return Err(EngineError::NonFiniteSignal {
                signal: "totalIAE",
                t: f64::NAN,
            });
        }
    }
    Ok(entries)
}

/// Top-level entry point: dispatch by mode and fold faults into the error
/// response shape.
pub fn handle_request(req: &EngineRequest) -> EngineResponse {
    match req.mode {
        Mode::Single => match run_single(req) {
            Ok(resp) => EngineResponse::Single(resp),
            Err(e) => EngineResponse::Error(ErrorResponse {
                error: e.to_string(),
            }),
        },
        Mode::Suite => match run_suite(req) {
            Ok(entries) => EngineResponse::Suite(entries),
            Err(e) => EngineResponse::Error(ErrorResponse {
                error: e.to_string(),
            }),
        },
    }
}
