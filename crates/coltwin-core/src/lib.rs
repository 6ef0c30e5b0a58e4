//! coltwin - digital twin of a semi-continuous distillation train
//!
//! A fixed-step simulation of a seven-block FOPDT plant closed by six PI
//! loops, with a hysteretic product/recycle quality gate, a safety-interlock
//! table, per-loop performance metrics and a deterministic scenario suite.
//!
//! # Architecture
//!
//! The scheduler owns one plant, six controllers, one gate and the interlock
//! table for the duration of a run. Each step runs a fixed phase order:
//! disturbances and setpoint ramping, plant advance, controller updates,
//! interlock overrides, controller re-tracking, gate override, logging. The
//! produced trace is a pre-sized column store consumed by the metrics pass.
//!
//! # Example
//!
//! ```rust,ignore
//! use coltwin_core::prelude::*;
//! use coltwin_types::Scenario;
//!
//! let scenario = Scenario::default();
//! let trace = Scheduler::new(&scenario).run();
//! let stats = gate_stats(trace.routes());
//! ```

pub mod blocks;
pub mod engine;
pub mod gate;
pub mod interlock;
pub mod metrics;
pub mod plant;
pub mod scheduler;
pub mod suite;
pub mod trace;

pub use blocks::{ControlAction, FopdtBlock, MeasurementNoise, PiController};
pub use engine::{handle_request, run_single, run_suite, scenario_from_request, EngineError};
pub use gate::{QualityGate, Route};
pub use interlock::{InterlockRule, InterlockTable};
pub use plant::{MvBundle, PlantModel, PvRecord};
pub use scheduler::Scheduler;
pub use suite::{run_suite_scenarios, suite_scenarios};
pub use trace::Trace;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::blocks::{ControlAction, FopdtBlock, MeasurementNoise, PiController};
    pub use crate::engine::{
        handle_request, run_single, run_suite, scenario_from_request, EngineError,
    };
    pub use crate::gate::{QualityGate, Route};
    pub use crate::interlock::{InterlockRule, InterlockTable};
    pub use crate::metrics::{
        gate_stats, loop_metrics, metric_records, LoopMetrics, SettlingTime,
    };
    pub use crate::plant::{MvBundle, PlantModel, PvRecord};
    pub use crate::scheduler::Scheduler;
    pub use crate::suite::{run_suite_scenarios, suite_scenarios};
    pub use crate::trace::Trace;
}
