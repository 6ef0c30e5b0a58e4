//! External request record.
//!
//! The host delivers one parameter bundle per run. Field values arrive from
//! form inputs, so every numeric field tolerates numbers, numeric strings,
//! `null` or absence, and boolean fields additionally accept the strings
//! `"true"` / `"false"`. Anything unusable decodes to `None` and the engine
//! substitutes the default.

use serde::{Deserialize, Deserializer, Serialize};

/// Engine run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Suite,
}

/// Raw numeric field: number, numeric string, or nothing usable.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNum {
    Num(f64),
    Str(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNum>::deserialize(de)?;
    Ok(match raw {
        Some(RawNum::Num(v)) if v.is_finite() => Some(v),
        Some(RawNum::Str(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    })
}

fn lenient_u64<'de, D>(de: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(de)?
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u64))
}

/// Raw boolean field: native bool or a string form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBool {
    Bool(bool),
    Str(String),
    Other(serde::de::IgnoredAny),
}

fn lenient_bool<'de, D>(de: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawBool>::deserialize(de)?;
    Ok(match raw {
        Some(RawBool::Bool(b)) => Some(b),
        Some(RawBool::Str(s)) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn lenient_mode<'de, D>(de: D) -> Result<Mode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(match raw.as_deref().map(str::trim) {
        Some("suite") => Mode::Suite,
        _ => Mode::Single,
    })
}

/// The parameter bundle the host sends for one run.
///
/// Every field except `mode` is optional; missing or malformed values fall
/// back to the engine defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(non_snake_case)]
pub struct EngineRequest {
    #[serde(default, deserialize_with = "lenient_mode")]
    pub mode: Mode,

    /// Simulated duration, seconds. Clamped to [600, 7200].
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sim_s: Option<f64>,
    /// Time step, seconds. Clamped to [0.5, 5.0].
    #[serde(default, deserialize_with = "lenient_f64")]
    pub dt: Option<f64>,
    /// Measurement noise on/off.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub noise: Option<bool>,
    /// RNG seed for noisy single runs.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub seed: Option<u64>,

    // Setpoints.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Ffeed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Tfeed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Treb: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Tcond: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Freflux: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub sp_Lv201: Option<f64>,

    // Per-loop tuning. Kp must be >= 0 and Ti > 0; out-of-range values fall
    // back to the loop default.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_fic101: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_fic101: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_tic101: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_tic101: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_tic102: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_tic102: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_tic201: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_tic201: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_fic201: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_fic201: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub kp_lic201: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ti_lic201: Option<f64>,

    // Quality-gate knobs. Low/high pairs are swapped when inverted; OFF
    // thresholds are derived by the gate.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_tt_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_tt_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_rho_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_rho_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_dTsub: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_delay_on: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub g_delay_off: Option<f64>,

    /// Enables the analyzer-fail injection in single mode.
    #[serde(default, deserialize_with = "lenient_bool")]
    pub analyzerFail: Option<bool>,
}
