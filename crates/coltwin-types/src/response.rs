//! Response records returned to the host.
//!
//! Field names follow the wire contract of the dashboard, hence the
//! camel-case/tag-style serde renames.

use serde::{Deserialize, Serialize};

/// One downsampled chart sample. `route` and `analyzer_ok` are carried as
/// 0/1 so the host can plot them on a numeric axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub t: f64,
    #[serde(rename = "Tfeed")]
    pub t_feed: f64,
    #[serde(rename = "SP_Tfeed")]
    pub sp_t_feed: f64,
    #[serde(rename = "Treb")]
    pub t_reb: f64,
    #[serde(rename = "SP_Treb")]
    pub sp_t_reb: f64,
    #[serde(rename = "Tcond")]
    pub t_cond: f64,
    #[serde(rename = "SP_Tcond")]
    pub sp_t_cond: f64,
    #[serde(rename = "TT106")]
    pub tt106: f64,
    #[serde(rename = "TT201")]
    pub tt201: f64,
    pub rho15: f64,
    #[serde(rename = "Gate_rho_low")]
    pub gate_rho_low: f64,
    #[serde(rename = "Gate_rho_high")]
    pub gate_rho_high: f64,
    #[serde(rename = "dTsub")]
    pub dtsub: f64,
    #[serde(rename = "Gate_dTsub_min")]
    pub gate_dtsub_min: f64,
    pub route: u8,
    pub analyzer_ok: u8,
    #[serde(rename = "Ffeed")]
    pub f_feed: f64,
    #[serde(rename = "SP_Ffeed")]
    pub sp_f_feed: f64,
    #[serde(rename = "Freflux")]
    pub f_reflux: f64,
    #[serde(rename = "SP_Freflux")]
    pub sp_f_reflux: f64,
    #[serde(rename = "Lv201")]
    pub l_v201: f64,
    #[serde(rename = "SP_Lv201")]
    pub sp_l_v201: f64,
    pub u_feed: f64,
    pub u_steam_pre: f64,
    pub u_steam_reb: f64,
    pub u_cw: f64,
    pub u_reflux: f64,
    pub u_draw: f64,
}

/// Per-loop performance metrics. Overshoot and settling time are null when
/// not defined for the run (no meaningful setpoint change, or a numerically
/// zero reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    #[serde(rename = "IAE")]
    pub iae: f64,
    #[serde(rename = "ITAE")]
    pub itae: f64,
    #[serde(rename = "OvershootPct")]
    pub overshoot_pct: Option<f64>,
    #[serde(rename = "SettlingTime")]
    pub settling_time_s: Option<f64>,
}

/// Routing statistics over a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateStats {
    #[serde(rename = "productPct")]
    pub product_pct: f64,
    pub switches: usize,
}

/// One timestamped event (gate switch, interlock transition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub t: f64,
    pub msg: String,
}

/// Single-mode response bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleResponse {
    #[serde(rename = "chartData")]
    pub chart_data: Vec<ChartPoint>,
    pub metrics: Vec<MetricRecord>,
    pub gate: GateStats,
    #[serde(rename = "eventLog")]
    pub event_log: Vec<EventRecord>,
}

/// One suite scenario result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteEntry {
    pub name: String,
    pub gate: GateStats,
    #[serde(rename = "totalIAE")]
    pub total_iae: f64,
    pub metrics: Vec<MetricRecord>,
}

/// Error response: the engine could not produce a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The three response shapes, serialized untagged so the host sees exactly
/// the single bundle, the suite array, or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Single(SingleResponse),
    Suite(Vec<SuiteEntry>),
    Error(ErrorResponse),
}
