//! Run trace: pre-sized column store plus the event list.

use std::io::{self, Write};

use coltwin_types::{ChartPoint, EventRecord, GateConfig, LoopId, Setpoints};

use crate::gate::Route;
use crate::plant::{MvBundle, PvRecord};

/// Column-oriented record of a complete run, one row per step.
///
/// Columns are allocated up front from the known step count, so the hot loop
/// never reallocates.
#[derive(Debug, Clone)]
pub struct Trace {
    pub t: Vec<f64>,

    pub f_feed: Vec<f64>,
    pub t_feed_out: Vec<f64>,
    pub t_reb: Vec<f64>,
    pub f_reflux: Vec<f64>,
    pub t_cond_out: Vec<f64>,
    pub tt106: Vec<f64>,
    pub tt201: Vec<f64>,
    pub rho15: Vec<f64>,
    pub l_v201: Vec<f64>,
    pub dtsub: Vec<f64>,

    pub sp_f_feed: Vec<f64>,
    pub sp_t_feed: Vec<f64>,
    pub sp_t_reb: Vec<f64>,
    pub sp_t_cond: Vec<f64>,
    pub sp_f_reflux: Vec<f64>,
    pub sp_l_v201: Vec<f64>,

    pub u_feed: Vec<f64>,
    pub u_steam_pre: Vec<f64>,
    pub u_steam_reb: Vec<f64>,
    pub u_cw: Vec<f64>,
    pub u_reflux: Vec<f64>,
    pub u_draw: Vec<f64>,

    pub route: Vec<Route>,
    pub analyzer_ok: Vec<bool>,

    events: Vec<EventRecord>,
}

impl Trace {
    /// Allocate for `samples` rows.
    pub fn with_capacity(samples: usize) -> Self {
        macro_rules! col {
            () => {
                Vec::with_capacity(samples)
            };
        }
        Self {
            t: col!(),
            f_feed: col!(),
            t_feed_out: col!(),
            t_reb: col!(),
            f_reflux: col!(),
            t_cond_out: col!(),
            tt106: col!(),
            tt201: col!(),
            rho15: col!(),
            l_v201: col!(),
            dtsub: col!(),
            sp_f_feed: col!(),
            sp_t_feed: col!(),
            sp_t_reb: col!(),
            sp_t_cond: col!(),
            sp_f_reflux: col!(),
            sp_l_v201: col!(),
            u_feed: col!(),
            u_steam_pre: col!(),
            u_steam_reb: col!(),
            u_cw: col!(),
            u_reflux: col!(),
            u_draw: col!(),
            route: col!(),
            analyzer_ok: col!(),
            events: Vec::new(),
        }
    }

    /// Number of recorded rows.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Append one complete row.
    pub fn append(&mut self, t: f64, pv: &PvRecord, sp: &Setpoints, mv: &MvBundle, route: Route) {
        self.t.push(t);

        self.f_feed.push(pv.f_feed);
        self.t_feed_out.push(pv.t_feed_out);
        self.t_reb.push(pv.t_reb);
        self.f_reflux.push(pv.f_reflux);
        self.t_cond_out.push(pv.t_cond_out);
        self.tt106.push(pv.tt106);
        self.tt201.push(pv.tt201);
        self.rho15.push(pv.rho15);
        self.l_v201.push(pv.l_v201);
        self.dtsub.push(pv.dtsub());

        self.sp_f_feed.push(sp.f_feed);
        self.sp_t_feed.push(sp.t_feed);
        self.sp_t_reb.push(sp.t_reb);
        self.sp_t_cond.push(sp.t_cond);
        self.sp_f_reflux.push(sp.f_reflux);
        self.sp_l_v201.push(sp.l_v201);

        self.u_feed.push(mv.u_feed);
        self.u_steam_pre.push(mv.u_steam_pre);
        self.u_steam_reb.push(mv.u_steam_reb);
        self.u_cw.push(mv.u_cw);
        self.u_reflux.push(mv.u_reflux);
        self.u_draw.push(mv.u_draw);

        self.route.push(route);
        self.analyzer_ok.push(pv.analyzer_ok);
    }

    /// Record a timestamped event.
    pub fn push_event(&mut self, t: f64, msg: String) {
        self.events.push(EventRecord { t, msg });
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn routes(&self) -> &[Route] {
        &self.route
    }

    /// `(t, sp, pv)` columns for one loop.
    pub fn loop_series(&self, id: LoopId) -> (&[f64], &[f64], &[f64]) {
        match id {
            LoopId::Fic101 => (&self.t, &self.sp_f_feed, &self.f_feed),
            LoopId::Tic101 => (&self.t, &self.sp_t_feed, &self.t_feed_out),
            LoopId::Tic102 => (&self.t, &self.sp_t_reb, &self.t_reb),
            LoopId::Tic201 => (&self.t, &self.sp_t_cond, &self.t_cond_out),
            LoopId::Fic201 => (&self.t, &self.sp_f_reflux, &self.f_reflux),
            LoopId::Lic201 => (&self.t, &self.sp_l_v201, &self.l_v201),
        }
    }

    /// Downsample into chart records, at most `cap` points, single linear
    /// scan with a fixed stride.
    pub fn chart_data(&self, gate: &GateConfig, cap: usize) -> Vec<ChartPoint> {
        let n = self.len();
        if n == 0 || cap == 0 {
            return Vec::new();
        }
        let stride = n.div_ceil(cap);

        let mut points = Vec::with_capacity(n / stride + 1);
        for i in (0..n).step_by(stride) {
            points.push(ChartPoint {
                t: self.t[i],
                t_feed: self.t_feed_out[i],
                sp_t_feed: self.sp_t_feed[i],
                t_reb: self.t_reb[i],
                sp_t_reb: self.sp_t_reb[i],
                t_cond: self.t_cond_out[i],
                sp_t_cond: self.sp_t_cond[i],
                tt106: self.tt106[i],
                tt201: self.tt201[i],
                rho15: self.rho15[i],
                gate_rho_low: gate.rho15_on_low,
                gate_rho_high: gate.rho15_on_high,
                dtsub: self.dtsub[i],
                gate_dtsub_min: gate.dtsub_min,
                route: match self.route[i] {
                    Route::Recycle => 0,
                    Route::Product => 1,
                },
                analyzer_ok: self.analyzer_ok[i] as u8,
                f_feed: self.f_feed[i],
                sp_f_feed: self.sp_f_feed[i],
                f_reflux: self.f_reflux[i],
                sp_f_reflux: self.sp_f_reflux[i],
                l_v201: self.l_v201[i],
                sp_l_v201: self.sp_l_v201[i],
                u_feed: self.u_feed[i],
                u_steam_pre: self.u_steam_pre[i],
                u_steam_reb: self.u_steam_reb[i],
                u_cw: self.u_cw[i],
                u_reflux: self.u_reflux[i],
                u_draw: self.u_draw[i],
            });
        }
        points
    }

    /// Write the full trace as CSV (diagnostic surface, not on the hot path).
    pub fn write_csv<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(
            w,
            "t,Ffeed,Tfeed,Treb,Freflux,Tcond,TT106,TT201,rho15,Lv201,dTsub,\
             SP_Ffeed,SP_Tfeed,SP_Treb,SP_Tcond,SP_Freflux,SP_Lv201,\
             u_feed,u_steam_pre,u_steam_reb,u_cw,u_reflux,u_draw,route,analyzer_ok"
        )?;
        for i in 0..self.len() {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                self.t[i],
                self.f_feed[i],
                self.t_feed_out[i],
                self.t_reb[i],
                self.f_reflux[i],
                self.t_cond_out[i],
                self.tt106[i],
                self.tt201[i],
                self.rho15[i],
                self.l_v201[i],
                self.dtsub[i],
                self.sp_f_feed[i],
                self.sp_t_feed[i],
                self.sp_t_reb[i],
                self.sp_t_cond[i],
                self.sp_f_reflux[i],
                self.sp_l_v201[i],
                self.u_feed[i],
                self.u_steam_pre[i],
                self.u_steam_reb[i],
                self.u_cw[i],
                self.u_reflux[i],
                self.u_draw[i],
                self.route[i].as_str(),
                self.analyzer_ok[i] as u8,
            )?;
        }
        Ok(())
    }
}
