//! Full suite run against the default configuration.

use coltwin_core::prelude::*;
use coltwin_types::Scenario;

#[test]
fn all_ten_scenarios_complete_with_six_loop_metrics_each() {
    let entries = run_suite_scenarios(&Scenario::default());
    assert_eq!(entries.len(), 10);
    for entry in &entries {
        assert_eq!(entry.metrics.len(), 6, "{}", entry.name);
        assert!(entry.total_iae.is_finite(), "{}", entry.name);
        assert!(entry.total_iae >= 0.0, "{}", entry.name);
    }
}

#[test]
fn baseline_has_the_lowest_total_iae() {
    let entries = run_suite_scenarios(&Scenario::default());
    let a0 = entries.iter().find(|e| e.name == "A0_BASELINE").unwrap();
    for entry in &entries {
        assert!(
            entry.total_iae >= a0.total_iae,
            "{} totalIAE {} below baseline {}",
            entry.name,
            entry.total_iae,
            a0.total_iae
        );
    }
    // Every stepped or disturbed scenario accumulates real error.
    for entry in entries.iter().filter(|e| {
        e.name.starts_with('B') || e.name == "C1_DIST_FEED_TEMP" || e.name == "C2_DIST_CW_DEGRADE"
    }) {
        assert!(
            entry.total_iae > a0.total_iae,
            "{} should exceed baseline",
            entry.name
        );
    }
}

#[test]
fn cw_degradation_scenario_raises_the_switch_count() {
    let entries = run_suite_scenarios(&Scenario::default());
    let a0 = entries.iter().find(|e| e.name == "A0_BASELINE").unwrap();
    let c2 = entries
        .iter()
        .find(|e| e.name == "C2_DIST_CW_DEGRADE")
        .unwrap();
    assert!(
        c2.gate.switches > a0.gate.switches,
        "C2 {} vs A0 {}",
        c2.gate.switches,
        a0.gate.switches
    );
}

#[test]
fn analyzer_fail_scenario_caps_the_product_share() {
    let entries = run_suite_scenarios(&Scenario::default());
    let a0 = entries.iter().find(|e| e.name == "A0_BASELINE").unwrap();
    let c3 = entries
        .iter()
        .find(|e| e.name == "C3_ANALYZER_FAIL")
        .unwrap();
    // The analyzer dies at t = 1800 of 3600, so C3 loses roughly half of the
    // baseline's product share.
    assert!(c3.gate.product_pct < a0.gate.product_pct - 40.0);
}

#[test]
fn stepped_scenarios_settle_their_own_loop() {
    let entries = run_suite_scenarios(&Scenario::default());
    for (name, loop_name) in [
        ("B1_STEP_TIC101", "TIC101"),
        ("B2_STEP_TIC102", "TIC102"),
        ("B3_STEP_TIC201", "TIC201"),
        ("B4_STEP_FIC101", "FIC101"),
        ("B5_STEP_FIC201", "FIC201"),
        ("B6_STEP_LIC201", "LIC201"),
    ] {
        let entry = entries.iter().find(|e| e.name == name).unwrap();
        let m = entry.metrics.iter().find(|m| m.name == loop_name).unwrap();
        assert!(
            m.settling_time_s.is_some(),
            "{name}: {loop_name} did not settle"
        );
    }
}

#[test]
fn suite_runs_are_deterministic() {
    let a = run_suite_scenarios(&Scenario::default());
    let b = run_suite_scenarios(&Scenario::default());
    assert_eq!(a, b);
}
