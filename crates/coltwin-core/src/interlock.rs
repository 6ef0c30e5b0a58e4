//! Safety-interlock table.
//!
//! Six fixed-order rules evaluated against the current step's measurements.
//! Actions mutate the valve bundle and/or force the distillate route; they
//! never touch controller state. The scheduler re-tracks the affected
//! controllers afterwards.

use coltwin_types::InterlockConfig;

use crate::gate::Route;
use crate::plant::{MvBundle, PvRecord};

/// The interlock rules, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterlockRule {
    /// IL-01: feed preheater outlet temperature high-high.
    FeedTempHigh,
    /// IL-02: reboiler temperature high-high.
    RebTempHigh,
    /// IL-03: condenser outlet temperature high-high.
    CondTempHigh,
    /// IL-04: reflux-drum level high-high.
    DrumLevelHigh,
    /// IL-05: reflux-drum level low-low.
    DrumLevelLow,
    /// IL-06: quality analyzer fault.
    AnalyzerFault,
}

impl InterlockRule {
    /// Evaluation order. Later rules see valve changes made by earlier ones;
    /// predicates always see the unmutated measurements.
    pub const ALL: [InterlockRule; 6] = [
        InterlockRule::FeedTempHigh,
        InterlockRule::RebTempHigh,
        InterlockRule::CondTempHigh,
        InterlockRule::DrumLevelHigh,
        InterlockRule::DrumLevelLow,
        InterlockRule::AnalyzerFault,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            InterlockRule::FeedTempHigh => "IL-01",
            InterlockRule::RebTempHigh => "IL-02",
            InterlockRule::CondTempHigh => "IL-03",
            InterlockRule::DrumLevelHigh => "IL-04",
            InterlockRule::DrumLevelLow => "IL-05",
            InterlockRule::AnalyzerFault => "IL-06",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InterlockRule::FeedTempHigh => "feed outlet temperature high-high, preheat steam closed",
            InterlockRule::RebTempHigh => "reboiler temperature high-high, reboiler steam closed",
            InterlockRule::CondTempHigh => "condenser outlet temperature high-high, routing to recycle",
            InterlockRule::DrumLevelHigh => "drum level high-high, draw forced open",
            InterlockRule::DrumLevelLow => "drum level low-low, draw forced closed",
            InterlockRule::AnalyzerFault => "analyzer fault, routing to recycle",
        }
    }

    fn is_tripped(&self, pv: &PvRecord, cfg: &InterlockConfig) -> bool {
        match self {
            InterlockRule::FeedTempHigh => pv.t_feed_out >= cfg.t_feed_hh,
            InterlockRule::RebTempHigh => pv.t_reb >= cfg.t_reb_hh,
            InterlockRule::CondTempHigh => pv.t_cond_out >= cfg.t_cond_out_hh,
            InterlockRule::DrumLevelHigh => pv.l_v201 >= cfg.level_hh,
            InterlockRule::DrumLevelLow => pv.l_v201 <= cfg.level_ll,
            InterlockRule::AnalyzerFault => !pv.analyzer_ok,
        }
    }

    fn apply(&self, mv: &mut MvBundle, cfg: &InterlockConfig) {
        match self {
            InterlockRule::FeedTempHigh => mv.u_steam_pre = 0.0,
            InterlockRule::RebTempHigh => mv.u_steam_reb = 0.0,
            InterlockRule::CondTempHigh => mv.force_route = Some(Route::Recycle),
            InterlockRule::DrumLevelHigh => mv.u_draw = mv.u_draw.max(cfg.u_draw_force_high),
            InterlockRule::DrumLevelLow => mv.u_draw = mv.u_draw.min(cfg.u_draw_force_low),
            InterlockRule::AnalyzerFault => mv.force_route = Some(Route::Recycle),
        }
    }
}

/// Which rules tripped this step, in `InterlockRule::ALL` order.
pub type ActiveSet = [bool; 6];

/// The fixed rule table with its trip thresholds.
#[derive(Debug, Clone)]
pub struct InterlockTable {
    cfg: InterlockConfig,
}

impl InterlockTable {
    pub fn new(cfg: InterlockConfig) -> Self {
        Self { cfg }
    }

    /// Walk the table once. Tripped rules mutate `mv` in place; the returned
    /// set drives the ON/OFF event edges.
    pub fn evaluate(&self, pv: &PvRecord, mv: &mut MvBundle) -> ActiveSet {
        let mut active = [false; 6];
        for (slot, rule) in active.iter_mut().zip(InterlockRule::ALL) {
            if rule.is_tripped(pv, &self.cfg) {
                rule.apply(mv, &self.cfg);
                *slot = true;
            }
        }
        active
    }
}
