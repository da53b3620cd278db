//! Training schedule configuration: loops, learning rate schedulers and
//! optimizer settings.

mod common;
pub mod config;
pub mod zoo;

pub use config::*;
pub use zoo::SchedulePreset;
