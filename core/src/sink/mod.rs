//! Consumer pipelines.
//!
//! A sink is plain business logic fed one event at a time. A consumer
//! pipeline runs a sink on its own thread behind an `or_done` relay:
//! - `threshold`: fraud detection, flags amounts above a threshold
//! - `aggregate`: analytics, running sum/count and final average

pub mod threshold;
pub mod aggregate;
pub mod consumer;

pub use threshold::{classify, Classification, ThresholdReport, ThresholdSink};
pub use aggregate::{AggregateReport, AggregationSink};
pub use consumer::{consume, spawn_consumer, ConsumerHandles, ConsumerReport};

use crate::types::Event;

/// Terminal stage logic. `finish` runs once the input has ended.
pub trait Sink: Send + 'static {
    type Report: Send + 'static;

    /// Log prefix, e.g. `FRAUD`.
    fn tag(&self) -> &'static str;

    fn accept(&mut self, event: Event);

    fn finish(self) -> Self::Report;
}
