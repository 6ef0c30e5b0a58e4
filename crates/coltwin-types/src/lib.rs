//! Shared data types for the coltwin engine boundary.
//!
//! This crate holds plain records only: the scenario bundle consumed by the
//! scheduler, the lenient external request record, and the response records
//! returned to the host. All behavior lives in `coltwin-core`.

pub mod request;
pub mod response;
pub mod scenario;

pub use request::{EngineRequest, Mode};
pub use response::{
    ChartPoint, EngineResponse, ErrorResponse, EventRecord, GateStats, MetricRecord,
    SingleResponse, SuiteEntry,
};
pub use scenario::{
    DisturbanceSchedule, DisturbanceStep, GateConfig, InterlockConfig, LoopId, LoopTuning,
    MetricOptions, MvInit, PiTuning, RampRates, Scenario, Setpoints, SimSettings, SpStep,
};
