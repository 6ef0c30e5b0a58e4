//! Scenario configuration types.

use serde::{Deserialize, Serialize};

/// The six control loops of the train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopId {
    /// Feed flow (u_feed -> F_feed)
    Fic101,
    /// Feed preheater outlet temperature (u_steam_pre -> T_feed_out)
    Tic101,
    /// Reboiler temperature (u_steam_reb -> T_reb)
    Tic102,
    /// Condenser outlet temperature (u_cw -> T_cond_out)
    Tic201,
    /// Reflux flow (u_reflux -> F_reflux)
    Fic201,
    /// Reflux-drum level (u_draw -> L_v201)
    Lic201,
}

impl LoopId {
    /// All loops in scheduler execution order.
    pub const ALL: [LoopId; 6] = [
        LoopId::Fic101,
        LoopId::Tic101,
        LoopId::Tic102,
        LoopId::Tic201,
        LoopId::Fic201,
        LoopId::Lic201,
    ];

    /// Tag name used in metric records and event messages.
    pub fn name(&self) -> &'static str {
        match self {
            LoopId::Fic101 => "FIC101",
            LoopId::Tic101 => "TIC101",
            LoopId::Tic102 => "TIC102",
            LoopId::Tic201 => "TIC201",
            LoopId::Fic201 => "FIC201",
            LoopId::Lic201 => "LIC201",
        }
    }

    /// Parse a setpoint-step event key. Unknown keys yield `None` and are
    /// ignored by the scheduler.
    pub fn from_sp_key(key: &str) -> Option<LoopId> {
        match key {
            "Ffeed" => Some(LoopId::Fic101),
            "Tfeed" => Some(LoopId::Tic101),
            "Treb" => Some(LoopId::Tic102),
            "Tcond" => Some(LoopId::Tic201),
            "Freflux" => Some(LoopId::Fic201),
            "Lv201" => Some(LoopId::Lic201),
            _ => None,
        }
    }
}

/// Simulation horizon and step settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSettings {
    /// Simulated duration in seconds.
    pub sim_s: f64,
    /// Fixed time step in seconds.
    pub dt: f64,
    /// Measurement noise on/off.
    pub noise: bool,
    /// RNG seed for noisy runs. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            sim_s: 3600.0,
            dt: 1.0,
            noise: false,
            seed: None,
        }
    }
}

/// Base setpoints for the six loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setpoints {
    pub f_feed: f64,
    pub t_feed: f64,
    pub t_reb: f64,
    pub t_cond: f64,
    pub f_reflux: f64,
    pub l_v201: f64,
}

impl Default for Setpoints {
    fn default() -> Self {
        Self {
            f_feed: 50.0,
            t_feed: 120.0,
            t_reb: 165.0,
            t_cond: 35.0,
            f_reflux: 50.0,
            l_v201: 50.0,
        }
    }
}

impl Setpoints {
    pub fn get(&self, id: LoopId) -> f64 {
        match id {
            LoopId::Fic101 => self.f_feed,
            LoopId::Tic101 => self.t_feed,
            LoopId::Tic102 => self.t_reb,
            LoopId::Tic201 => self.t_cond,
            LoopId::Fic201 => self.f_reflux,
            LoopId::Lic201 => self.l_v201,
        }
    }

    pub fn get_mut(&mut self, id: LoopId) -> &mut f64 {
        match id {
            LoopId::Fic101 => &mut self.f_feed,
            LoopId::Tic101 => &mut self.t_feed,
            LoopId::Tic102 => &mut self.t_reb,
            LoopId::Tic201 => &mut self.t_cond,
            LoopId::Fic201 => &mut self.f_reflux,
            LoopId::Lic201 => &mut self.l_v201,
        }
    }
}

/// Proportional gain and integral time for one PI loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiTuning {
    pub kp: f64,
    pub ti: f64,
}

/// Tuning for all six loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopTuning {
    pub fic101: PiTuning,
    pub tic101: PiTuning,
    pub tic102: PiTuning,
    pub tic201: PiTuning,
    pub fic201: PiTuning,
    pub lic201: PiTuning,
}

impl Default for LoopTuning {
    fn default() -> Self {
        Self {
            fic101: PiTuning { kp: 1.5, ti: 10.0 },
            tic101: PiTuning { kp: 1.0, ti: 40.0 },
            tic102: PiTuning { kp: 0.8, ti: 60.0 },
            tic201: PiTuning { kp: 0.3, ti: 30.0 },
            fic201: PiTuning { kp: 1.5, ti: 10.0 },
            lic201: PiTuning { kp: 2.5, ti: 300.0 },
        }
    }
}

impl LoopTuning {
    pub fn get(&self, id: LoopId) -> PiTuning {
        match id {
            LoopId::Fic101 => self.fic101,
            LoopId::Tic101 => self.tic101,
            LoopId::Tic102 => self.tic102,
            LoopId::Tic201 => self.tic201,
            LoopId::Fic201 => self.fic201,
            LoopId::Lic201 => self.lic201,
        }
    }

    pub fn get_mut(&mut self, id: LoopId) -> &mut PiTuning {
        match id {
            LoopId::Fic101 => &mut self.fic101,
            LoopId::Tic101 => &mut self.tic101,
            LoopId::Tic102 => &mut self.tic102,
            LoopId::Tic201 => &mut self.tic201,
            LoopId::Fic201 => &mut self.fic201,
            LoopId::Lic201 => &mut self.lic201,
        }
    }
}

/// Quality-gate ON thresholds, dwell times and the level permissive window.
///
/// OFF thresholds are derived by the gate itself (fixed hysteresis widening).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub tt106_on_low: f64,
    pub tt106_on_high: f64,
    pub rho15_on_low: f64,
    pub rho15_on_high: f64,
    pub dtsub_min: f64,
    pub delay_on_s: f64,
    pub delay_off_s: f64,
    pub perm_level_min: f64,
    pub perm_level_max: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            tt106_on_low: 93.0,
            tt106_on_high: 97.0,
            rho15_on_low: 0.7350,
            rho15_on_high: 0.7450,
            dtsub_min: 55.0,
            delay_on_s: 120.0,
            delay_off_s: 30.0,
            perm_level_min: 20.0,
            perm_level_max: 80.0,
        }
    }
}

/// Interlock trip thresholds and forced draw positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterlockConfig {
    pub t_feed_hh: f64,
    pub t_reb_hh: f64,
    pub t_cond_out_hh: f64,
    pub level_hh: f64,
    pub level_ll: f64,
    pub u_draw_force_high: f64,
    pub u_draw_force_low: f64,
}

impl Default for InterlockConfig {
    fn default() -> Self {
        Self {
            t_feed_hh: 135.0,
            t_reb_hh: 185.0,
            t_cond_out_hh: 46.0,
            level_hh: 90.0,
            level_ll: 10.0,
            u_draw_force_high: 80.0,
            u_draw_force_low: 5.0,
        }
    }
}

/// One scheduled disturbance: active from `t_start` onward with the given
/// amplitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceStep {
    pub t_start: f64,
    pub amplitude: f64,
}

/// The disturbance and failure schedule of a scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceSchedule {
    /// Additive feed-temperature disturbance into the preheater block.
    pub feed_temp: Option<DisturbanceStep>,
    /// Additive vapor-load disturbance into the reboiler block.
    pub vapor_load: Option<DisturbanceStep>,
    /// Multiplicative cooling-water degradation; amplitude is the fractional
    /// drop (0.25 = 25 % less effective cooling water).
    pub cw_degrade: Option<DisturbanceStep>,
    /// Analyzer failure time. `None` means the analyzer stays healthy.
    pub analyzer_fail_at: Option<f64>,
}

/// A setpoint step event: at time `t`, add `delta` to the setpoint named by
/// `key` ("Ffeed", "Tfeed", "Treb", "Tcond", "Freflux", "Lv201").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpStep {
    pub t: f64,
    pub key: String,
    pub delta: f64,
}

impl SpStep {
    pub fn new(t: f64, key: &str, delta: f64) -> Self {
        Self {
            t,
            key: key.to_string(),
            delta,
        }
    }
}

/// Per-loop setpoint ramp rates in engineering units per second.
///
/// A rate that is zero, negative or non-finite makes the ramped setpoint
/// jump straight to its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RampRates {
    pub f_feed: f64,
    pub t_feed: f64,
    pub t_reb: f64,
    pub t_cond: f64,
    pub f_reflux: f64,
    pub l_v201: f64,
}

impl Default for RampRates {
    fn default() -> Self {
        Self {
            f_feed: 0.5,
            t_feed: 0.1,
            t_reb: 0.1,
            t_cond: 0.1,
            f_reflux: 0.5,
            l_v201: 0.2,
        }
    }
}

impl RampRates {
    pub fn get(&self, id: LoopId) -> f64 {
        match id {
            LoopId::Fic101 => self.f_feed,
            LoopId::Tic101 => self.t_feed,
            LoopId::Tic102 => self.t_reb,
            LoopId::Tic201 => self.t_cond,
            LoopId::Fic201 => self.f_reflux,
            LoopId::Lic201 => self.l_v201,
        }
    }
}

/// Initial manipulated-variable positions. Defaults are the plant anchors,
/// i.e. the nominal operating point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MvInit {
    pub u_feed: f64,
    pub u_steam_pre: f64,
    pub u_steam_reb: f64,
    pub u_cw: f64,
    pub u_reflux: f64,
    pub u_draw: f64,
}

impl Default for MvInit {
    fn default() -> Self {
        Self {
            u_feed: 50.0,
            u_steam_pre: 35.0,
            u_steam_reb: 40.0,
            u_cw: 45.0,
            u_reflux: 55.0,
            u_draw: 25.0,
        }
    }
}

/// Metric computation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricOptions {
    /// Divide errors by the loop's span before integrating.
    pub normalize: bool,
    /// Settling band as a fraction of the final setpoint.
    pub settling_band: f64,
    /// Time the PV must stay inside the band to count as settled, seconds.
    pub hold_s: f64,
    /// Normalization span for the flow loops.
    pub span_flow: f64,
    /// Normalization span for the temperature loops.
    pub span_temp: f64,
    /// Normalization span for the level loop.
    pub span_level: f64,
}

impl Default for MetricOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            settling_band: 0.02,
            hold_s: 60.0,
            span_flow: 100.0,
            span_temp: 50.0,
            span_level: 100.0,
        }
    }
}

impl MetricOptions {
    /// Normalization span for a loop.
    pub fn span(&self, id: LoopId) -> f64 {
        match id {
            LoopId::Fic101 | LoopId::Fic201 => self.span_flow,
            LoopId::Tic101 | LoopId::Tic102 | LoopId::Tic201 => self.span_temp,
            LoopId::Lic201 => self.span_level,
        }
    }
}

/// The complete immutable input of one scheduler run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub sim: SimSettings,
    pub setpoints: Setpoints,
    pub tuning: LoopTuning,
    pub gate: GateConfig,
    pub interlocks: InterlockConfig,
    pub disturbances: DisturbanceSchedule,
    pub sp_steps: Vec<SpStep>,
    pub ramps: RampRates,
    pub mv_init: MvInit,
    pub metrics: MetricOptions,
}
