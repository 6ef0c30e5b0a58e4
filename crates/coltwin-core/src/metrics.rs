//! Control-performance metrics over a completed trace.

use coltwin_types::{GateStats, LoopId, MetricOptions, MetricRecord};

use crate::gate::Route;
use crate::trace::Trace;

/// Settling-time outcome.
///
/// `NotDefined` means the setpoint never meaningfully changed, so the metric
/// does not apply; `NotSettled` means it changed but the PV never held the
/// band for the full hold window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettlingTime {
    Seconds(f64),
    NotDefined,
    NotSettled,
}

impl SettlingTime {
    /// Nullable transport form: both undefined outcomes map to `None`.
    pub fn as_option(&self) -> Option<f64> {
        match self {
            SettlingTime::Seconds(t) => Some(*t),
            _ => None,
        }
    }
}

/// Metrics for one control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopMetrics {
    pub iae: f64,
    pub itae: f64,
    /// `None` when the reference is numerically zero.
    pub overshoot_pct: Option<f64>,
    pub settling: SettlingTime,
}

/// Compute the loop metrics from uniform `(t, sp, pv)` columns.
///
/// `span` divides the error before integrating when normalization is wanted;
/// `band` is the settling band as a fraction of the final setpoint; `hold_s`
/// is how long the PV must stay inside the band.
pub fn loop_metrics(
    t: &[f64],
    sp: &[f64],
    pv: &[f64],
    span: Option<f64>,
    band: f64,
    hold_s: f64,
) -> LoopMetrics {
    if t.len() < 2 || sp.len() != t.len() || pv.len() != t.len() {
        return LoopMetrics {
            iae: 0.0,
            itae: 0.0,
            overshoot_pct: None,
            settling: SettlingTime::NotDefined,
        };
    }

    let dt = t[1] - t[0];
    let scale = match span {
        Some(s) if s > 0.0 => 1.0 / s,
        _ => 1.0,
    };

    let mut iae = 0.0;
    let mut itae = 0.0;
    for i in 0..t.len() {
        let e = (sp[i] - pv[i]).abs() * scale;
        iae += e * dt;
        itae += t[i] * e * dt;
    }

    let sp_final = sp[sp.len() - 1];
    let overshoot_pct = if sp_final.abs() < 1e-9 {
        None
    } else {
        let peak = pv.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(((peak - sp_final) / sp_final.abs() * 100.0).max(0.0))
    };

    LoopMetrics {
        iae,
        itae,
        overshoot_pct,
        settling: settling_time(t, sp, pv, band, hold_s, dt),
    }
}

fn settling_time(t: &[f64], sp: &[f64], pv: &[f64], band: f64, hold_s: f64, dt: f64) -> SettlingTime {
    let sp0 = sp[0];
    let sp_final = sp[sp.len() - 1];

    // No meaningful setpoint change: the metric does not apply.
    if (sp_final - sp0).abs() <= (0.001 * sp0.abs().max(1.0)).max(1e-6) {
        return SettlingTime::NotDefined;
    }

    let tol = (sp_final.abs() * band).max(1e-6);
    let in_band = |i: usize| (pv[i] - sp_final).abs() <= tol;

    // The response starts where the PV first leaves the band.
    let start = (0..pv.len()).find(|&i| !in_band(i)).unwrap_or(0);

    let hold_steps = ((hold_s / dt).round() as usize).max(1);
    let mut run = 0usize;
    for i in start..pv.len() {
        if in_band(i) {
            run += 1;
            if run >= hold_steps {
                return SettlingTime::Seconds(t[i + 1 - run]);
            }
        } else {
            run = 0;
        }
    }
    SettlingTime::NotSettled
}

/// Metric records for all six loops of a trace, in reporting order.
pub fn metric_records(trace: &Trace, opts: &MetricOptions) -> Vec<MetricRecord> {
    LoopId::ALL
        .iter()
        .map(|&id| {
            let (t, sp, pv) = trace.loop_series(id);
            let span = opts.normalize.then(|| opts.span(id));
            let m = loop_metrics(t, sp, pv, span, opts.settling_band, opts.hold_s);
            MetricRecord {
                name: id.name().to_string(),
                iae: m.iae,
                itae: m.itae,
                overshoot_pct: m.overshoot_pct,
                settling_time_s: m.settling.as_option(),
            }
        })
        .collect()
}

/// Routing statistics over the route column.
///
/// The share divides by the step count `N` (one less than the sample
/// count); the first sample is always RECYCLE, so the share tops out at
/// 100 %.
pub fn gate_stats(routes: &[Route]) -> GateStats {
    if routes.len() < 2 {
        return GateStats {
            product_pct: 0.0,
            switches: 0,
        };
    }
    let steps = routes.len() - 1;
    let product = routes.iter().filter(|r| **r == Route::Product).count();
    let switches = routes.windows(2).filter(|w| w[0] != w[1]).count();
    GateStats {
        product_pct: 100.0 * product as f64 / steps as f64,
        switches,
    }
}
