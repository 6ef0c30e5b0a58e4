//! Deterministic scenario suite.
//!
//! Ten scenarios derived from a base configuration: a clean baseline, one
//! setpoint step per loop, and three disturbance/failure cases. Noise is
//! disabled for every suite scenario so results are reproducible.

use coltwin_types::{DisturbanceStep, Scenario, SpStep, SuiteEntry};

use crate::metrics::{gate_stats, metric_records};
use crate::scheduler::Scheduler;

/// Time of the per-loop setpoint steps.
const STEP_AT_S: f64 = 600.0;

/// Derive the ten suite scenarios from a base. Setpoints, tuning, gate and
/// interlock configuration carry over; steps, disturbances, noise and the
/// analyzer schedule are replaced per scenario.
pub fn suite_scenarios(base: &Scenario) -> Vec<(String, Scenario)> {
    let mut clean = base.clone();
    clean.sim.noise = false;
    clean.sim.seed = None;
    clean.sp_steps.clear();
    clean.disturbances = Default::default();

    let with_step = |key: &str, delta: f64| {
        let mut sc = clean.clone();
        sc.sp_steps.push(SpStep::new(STEP_AT_S, key, delta));
        sc
    };

    let mut c1 = clean.clone();
    c1.disturbances.feed_temp = Some(DisturbanceStep {
        t_start: 900.0,
        amplitude: 8.0,
    });

    let mut c2 = clean.clone();
    c2.disturbances.cw_degrade = Some(DisturbanceStep {
        t_start: 2100.0,
        amplitude: 0.25,
    });

    let mut c3 = clean.clone();
    c3.disturbances.analyzer_fail_at = Some(1800.0);

    vec![
        ("A0_BASELINE".to_string(), clean.clone()),
        ("B1_STEP_TIC101".to_string(), with_step("Tfeed", 3.0)),
        ("B2_STEP_TIC102".to_string(), with_step("Treb", 3.0)),
        ("B3_STEP_TIC201".to_string(), with_step("Tcond", 2.0)),
        ("B4_STEP_FIC101".to_string(), with_step("Ffeed", 5.0)),
        ("B5_STEP_FIC201".to_string(), with_step("Freflux", 5.0)),
        ("B6_STEP_LIC201".to_string(), with_step("Lv201", 5.0)),
        ("C1_DIST_FEED_TEMP".to_string(), c1),
        ("C2_DIST_CW_DEGRADE".to_string(), c2),
        ("C3_ANALYZER_FAIL".to_string(), c3),
    ]
}

/// Run every suite scenario to completion and report metrics.
pub fn run_suite_scenarios(base: &Scenario) -> Vec<SuiteEntry> {
    suite_scenarios(base)
        .into_iter()
        .map(|(name, scenario)| {
            let trace = Scheduler::new(&scenario).run();
            let metrics = metric_records(&trace, &scenario.metrics);
            let total_iae = metrics.iter().map(|m| m.iae).sum();
            SuiteEntry {
                name,
                gate: gate_stats(trace.routes()),
                total_iae,
                metrics,
            }
        })
        .collect()
}
