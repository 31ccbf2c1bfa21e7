// ## src/telemetry/mod.rs

//! telemetry/mod.rs
//! Per-stage counters, timers, and the immutable end-of-run report.
//!
//! Notes:
//! - Each stage owns its counters; nothing is shared while running.
//! - A stage hands its `StageReport` back when its thread exits.
//! - `PipelineReport` is assembled by the driver after shutdown.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
