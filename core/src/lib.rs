//! pipeline-core
//!
//! Cancellable streaming pipeline on OS threads.
//! One generator, a tee, and two consumer pipelines, all stopped by a
//! single shared cancellation token.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;

// Signals and observability
pub mod cancel;
pub mod telemetry;

// Stages
pub mod stream;
pub mod sink;

// Driver
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::cancel::CancellationToken;
    pub use crate::config::PipelineConfig;
    pub use crate::pipeline::{run_pipeline, RunningPipeline};
    pub use crate::sink::{AggregationSink, Classification, Sink, ThresholdSink};
    pub use crate::stream::{broadcast, or_done, tee, StageSet, TieBreak};
    pub use crate::telemetry::PipelineReport;
    pub use crate::types::{Event, PipelineError};
}
