//! GridWatch simulation driver.
//!
//! Wraps the pure `gridwatch_core` pipeline in a stateful engine and a
//! periodic scheduler:
//!
//! - [`SimulationEngine`] owns the immutable roster snapshot plus the
//!   current readings/anomaly maps, replaced atomically each tick so any
//!   number of readers never observe a torn update.
//! - [`scheduler::spawn`] drives the engine on a tokio interval. Ticks
//!   never overlap; shutdown is clean and lets an in-flight tick publish.
//!
//! The presentation layer consumes three read-only accessors
//! (`current_population`, `current_readings`, `current_anomalies`) and one
//! control call (`reconfigure`).

pub mod engine;
pub mod scheduler;

pub use engine::{SimParams, SimulationEngine};
pub use scheduler::{spawn, SchedulerHandle};
