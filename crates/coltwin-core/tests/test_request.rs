//! Engine boundary: JSON request in, response records out.

use coltwin_core::prelude::*;
use coltwin_types::{EngineRequest, EngineResponse};

fn request(json: &str) -> EngineRequest {
    serde_json::from_str(json).expect("request JSON")
}

#[test]
fn form_style_request_runs_end_to_end() {
    let req = request(
        r#"{
            "mode": "single",
            "sim_s": "3600",
            "dt": "1",
            "noise": "false",
            "sp_Treb": "168",
            "kp_tic102": "0.8",
            "ti_tic102": "60",
            "g_tt_low": "93",
            "g_tt_high": "97",
            "analyzerFail": "false"
        }"#,
    );
    let resp = run_single(&req).unwrap();

    assert!(resp.chart_data.len() <= 700);
    assert_eq!(resp.metrics.len(), 6);
    // The reboiler setpoint was raised, so its loop worked for a living.
    let tic102 = resp.metrics.iter().find(|m| m.name == "TIC102").unwrap();
    assert!(tic102.iae > 0.0);
    let last = resp.chart_data.last().unwrap();
    assert!((last.sp_t_reb - 168.0).abs() < 1e-9);
    assert!((last.t_reb - 168.0).abs() < 0.5);
}

#[test]
fn chart_points_carry_the_configured_gate_thresholds() {
    let req = request(r#"{"sim_s": 600, "g_rho_low": 0.735, "g_rho_high": 0.745, "g_dTsub": 52}"#);
    let resp = run_single(&req).unwrap();
    let p = &resp.chart_data[0];
    assert_eq!(p.gate_rho_low, 0.735);
    assert_eq!(p.gate_rho_high, 0.745);
    assert_eq!(p.gate_dtsub_min, 52.0);
}

#[test]
fn event_log_is_truncated_to_200_entries() {
    let req = request(r#"{"sim_s": 3600}"#);
    let resp = run_single(&req).unwrap();
    assert!(resp.event_log.len() <= 200);
}

#[test]
fn noiseless_responses_are_bit_identical() {
    let req = request(r#"{"sim_s": 1800, "sp_Tfeed": 122}"#);
    let a = serde_json::to_string(&run_single(&req).unwrap()).unwrap();
    let b = serde_json::to_string(&run_single(&req).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn seeded_noisy_responses_are_reproducible() {
    let req = request(r#"{"sim_s": 900, "noise": true, "seed": 31}"#);
    let a = serde_json::to_string(&run_single(&req).unwrap()).unwrap();
    let b = serde_json::to_string(&run_single(&req).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn suite_mode_returns_the_ten_entries() {
    let req = request(r#"{"mode": "suite", "noise": "true"}"#);
    match handle_request(&req) {
        EngineResponse::Suite(entries) => {
            assert_eq!(entries.len(), 10);
            assert_eq!(entries[0].name, "A0_BASELINE");
            // Suite mode ignores the noise flag: reruns must agree exactly.
            match handle_request(&req) {
                EngineResponse::Suite(again) => assert_eq!(entries, again),
                other => panic!("expected suite, got {other:?}"),
            }
        }
        other => panic!("expected suite, got {other:?}"),
    }
}

#[test]
fn single_response_serializes_with_wire_field_names() {
    let req = request(r#"{"sim_s": 600}"#);
    let resp = EngineResponse::Single(run_single(&req).unwrap());
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains(r#""chartData""#));
    assert!(json.contains(r#""eventLog""#));
    assert!(json.contains(r#""SP_Treb""#));
    assert!(json.contains(r#""productPct""#));
}

#[test]
fn analyzer_fail_request_shows_up_in_the_chart() {
    let req = request(r#"{"sim_s": 3600, "analyzerFail": true}"#);
    let resp = run_single(&req).unwrap();
    let dead: Vec<_> = resp
        .chart_data
        .iter()
        .filter(|p| p.analyzer_ok == 0)
        .collect();
    assert!(!dead.is_empty());
    assert!(dead.iter().all(|p| p.route == 0));
    assert!(dead.iter().all(|p| p.t >= 1800.0));
}
