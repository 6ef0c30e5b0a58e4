//! Plant model: seven FOPDT blocks, algebraic couplings and the reflux-drum
//! mass balance.

use crate::blocks::{FopdtBlock, MeasurementNoise};
use crate::gate::Route;

/// Nominal operating point.
pub const F_FEED0: f64 = 50.0;
pub const T_FEED0: f64 = 120.0;
pub const T_REB0: f64 = 165.0;
pub const T_COND0: f64 = 35.0;
pub const TT106_0: f64 = 95.0;
pub const RHO0: f64 = 0.7400;
pub const L0: f64 = 50.0;

/// Manipulated-variable anchors (the MV positions holding the nominal point).
pub const U_FEED0: f64 = 50.0;
pub const U_STEAM_PRE0: f64 = 35.0;
pub const U_STEAM_REB0: f64 = 40.0;
pub const U_CW0: f64 = 45.0;
pub const U_REFLUX0: f64 = 55.0;
pub const U_DRAW0: f64 = 25.0;

/// Nominal condensate inflow to the reflux drum.
pub const F_COND0: f64 = 70.0;

// Measurement-noise standard deviations per signal.
const SIGMA_F_FEED: f64 = 0.5;
const SIGMA_F_REFLUX: f64 = 0.4;
const SIGMA_T_FEED: f64 = 0.25;
const SIGMA_T_REB: f64 = 0.25;
const SIGMA_T_COND: f64 = 0.20;
const SIGMA_TT106: f64 = 0.20;
const SIGMA_TT201: f64 = 0.20;
const SIGMA_LEVEL: f64 = 0.2;
const SIGMA_RHO: f64 = 0.0005;

/// The six manipulated variables plus the interlock route override.
///
/// `force_route` is never read by the plant; it is the channel through which
/// the interlock table overrides the quality gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MvBundle {
    pub u_feed: f64,
    pub u_steam_pre: f64,
    pub u_steam_reb: f64,
    pub u_cw: f64,
    pub u_reflux: f64,
    pub u_draw: f64,
    pub force_route: Option<Route>,
}

impl MvBundle {
    pub fn new(
        u_feed: f64,
        u_steam_pre: f64,
        u_steam_reb: f64,
        u_cw: f64,
        u_reflux: f64,
        u_draw: f64,
    ) -> Self {
        Self {
            u_feed,
            u_steam_pre,
            u_steam_reb,
            u_cw,
            u_reflux,
            u_draw,
            force_route: None,
        }
    }

    /// All six valves at their anchors.
    pub fn anchors() -> Self {
        Self::new(
            U_FEED0,
            U_STEAM_PRE0,
            U_STEAM_REB0,
            U_CW0,
            U_REFLUX0,
            U_DRAW0,
        )
    }

    /// Clamp every valve to its 0-100 % range.
    pub fn clamp(&mut self) {
        self.u_feed = self.u_feed.clamp(0.0, 100.0);
        self.u_steam_pre = self.u_steam_pre.clamp(0.0, 100.0);
        self.u_steam_reb = self.u_steam_reb.clamp(0.0, 100.0);
        self.u_cw = self.u_cw.clamp(0.0, 100.0);
        self.u_reflux = self.u_reflux.clamp(0.0, 100.0);
        self.u_draw = self.u_draw.clamp(0.0, 100.0);
    }
}

/// One step's process variables, as measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PvRecord {
    pub f_feed: f64,
    pub t_feed_out: f64,
    pub t_reb: f64,
    pub f_reflux: f64,
    pub t_cond_out: f64,
    pub tt106: f64,
    pub tt201: f64,
    pub rho15: f64,
    pub l_v201: f64,
    pub analyzer_ok: bool,
}

impl PvRecord {
    /// Degree of subcooling, the product-quality proxy.
    pub fn dtsub(&self) -> f64 {
        self.tt201 - self.t_cond_out
    }
}

/// Fixed network of seven FOPDT blocks plus the reflux-drum inventory.
///
/// All block anchors are the nominal operating point, so with every valve at
/// its anchor the plant holds that point indefinitely. Noise, when present,
/// lives purely on the measurement layer; block states stay clean.
#[derive(Debug, Clone)]
pub struct PlantModel {
    g_ffeed: FopdtBlock,
    g_tfeed: FopdtBlock,
    g_treb: FopdtBlock,
    g_fref: FopdtBlock,
    g_tcond: FopdtBlock,
    g_tt106: FopdtBlock,
    g_rho: FopdtBlock,
    level: f64,
    dt: f64,

    d_feed_temp: f64,
    d_vapor_load: f64,
    cw_degrade: f64,
    analyzer_ok: bool,

    noise: Option<MeasurementNoise>,
}

impl PlantModel {
    /// Build a fresh plant at the nominal operating point.
    pub fn new(dt: f64, noise: Option<MeasurementNoise>) -> Self {
        Self {
            g_ffeed: FopdtBlock::new(1.0, 8.0, 2.0, dt, F_FEED0, U_FEED0),
            g_tfeed: FopdtBlock::new(0.8, 40.0, 10.0, dt, T_FEED0, U_STEAM_PRE0),
            g_treb: FopdtBlock::new(1.0, 60.0, 15.0, dt, T_REB0, U_STEAM_REB0),
            g_fref: FopdtBlock::new(0.9, 6.0, 1.0, dt, 50.0, U_REFLUX0),
            g_tcond: FopdtBlock::new(-3.0, 30.0, 8.0, dt, T_COND0, U_CW0),
            g_tt106: FopdtBlock::new(1.0, 25.0, 5.0, dt, TT106_0, TT106_0),
            g_rho: FopdtBlock::new(1.0, 45.0, 10.0, dt, RHO0, RHO0),
            level: L0,
            dt,
            d_feed_temp: 0.0,
            d_vapor_load: 0.0,
            cw_degrade: 1.0,
            analyzer_ok: true,
            noise,
        }
    }

    /// Set the disturbance inputs for the coming step. `cw_degrade` is the
    /// remaining cooling-water effectiveness and is clamped to [0, 1].
    pub fn set_disturbances(
        &mut self,
        d_feed_temp: f64,
        d_vapor_load: f64,
        cw_degrade: f64,
        analyzer_ok: bool,
    ) {
        self.d_feed_temp = d_feed_temp;
        self.d_vapor_load = d_vapor_load;
        self.cw_degrade = cw_degrade.clamp(0.0, 1.0);
        self.analyzer_ok = analyzer_ok;
    }

    /// Current cooling-water effectiveness.
    pub fn cw_degrade(&self) -> f64 {
        self.cw_degrade
    }

    /// Reflux-drum level (clean state, no measurement noise).
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Advance the plant one step with the given valve positions.
    pub fn update(&mut self, mv: &MvBundle) -> PvRecord {
        let mut mv = *mv;
        mv.clamp();

        // Primary lags.
        let f_feed = self.g_ffeed.update(mv.u_feed, 0.0);
        let t_feed_out = self.g_tfeed.update(mv.u_steam_pre, self.d_feed_temp);
        let t_reb = self.g_treb.update(mv.u_steam_reb, self.d_vapor_load);
        let f_reflux = self.g_fref.update(mv.u_reflux, 0.0);
        let t_cond_out = self.g_tcond.update(mv.u_cw * self.cw_degrade, 0.0);

        // Top-temperature proxy and its lag.
        let tt106_ss = TT106_0 + 0.35 * (t_reb - T_REB0) - 0.20 * (f_reflux - 50.0)
            + 0.05 * (f_feed - F_FEED0);
        let tt106 = self.g_tt106.update(tt106_ss, 0.0);
        let tt201 = tt106 + 0.20 * (t_reb - T_REB0);

        // Reflux-drum inventory.
        let f_cond_in =
            (F_COND0 + 0.20 * (t_reb - T_REB0) + 0.10 * (f_feed - F_FEED0)).max(0.0);
        let f_draw = 0.8 * mv.u_draw;
        self.level =
            (self.level + (f_cond_in - f_reflux - f_draw) * (self.dt / 200.0)).clamp(0.0, 100.0);

        // Product density.
        let rho_ss = RHO0 + 0.0009 * (tt106 - TT106_0) - 0.0011 * (f_reflux - 50.0);
        let rho15 = self.g_rho.update(rho_ss, 0.0);

        let mut pv = PvRecord {
            f_feed,
            t_feed_out,
            t_reb,
            f_reflux,
            t_cond_out,
            tt106,
            tt201,
            rho15,
            l_v201: self.level,
            analyzer_ok: self.analyzer_ok,
        };

        if let Some(noise) = self.noise.as_mut() {
            pv.f_feed += noise.sample(SIGMA_F_FEED);
            pv.t_feed_out += noise.sample(SIGMA_T_FEED);
            pv.t_reb += noise.sample(SIGMA_T_REB);
            pv.f_reflux += noise.sample(SIGMA_F_REFLUX);
            pv.t_cond_out += noise.sample(SIGMA_T_COND);
            pv.tt106 += noise.sample(SIGMA_TT106);
            pv.tt201 += noise.sample(SIGMA_TT201);
            pv.l_v201 += noise.sample(SIGMA_LEVEL);
            pv.rho15 += noise.sample(SIGMA_RHO);
        }

        pv
    }
}
