//! Process and controller blocks.

mod fopdt;
mod noise;
mod pi;

pub use fopdt::FopdtBlock;
pub use noise::MeasurementNoise;
pub use pi::{ControlAction, PiController};
