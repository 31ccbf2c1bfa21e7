// # 📂 `src/sink/consumer.rs`

//! Consumer pipeline = `or_done(branch)` → sink loop, each on its own thread.

use crossbeam::channel::Receiver;
use serde::Serialize;
use tracing::info;

use super::Sink;
use crate::cancel::CancellationToken;
use crate::stream::relay::or_done;
use crate::stream::sequence::Sequence;
use crate::stream::stage::{StageHandle, StageSet};
use crate::telemetry::{Stage, StageCounters, StageReport, StageTimer};
use crate::types::{Event, PipelineError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerReport<R> {
    pub stage: StageReport,
    pub report: R,
}

/// Both threads of one consumer pipeline.
#[derive(Debug)]
pub struct ConsumerHandles<R> {
    pub relay: StageHandle<StageReport>,
    pub sink: StageHandle<ConsumerReport<R>>,
}

/// Run `sink` over a cancellation-filtered view of `branch`.
pub fn spawn_consumer<S: Sink>(
    stages: &StageSet,
    relay_name: &'static str,
    sink_name: &'static str,
    done: &CancellationToken,
    branch: Receiver<Event>,
    sink: S,
) -> Result<ConsumerHandles<S::Report>, PipelineError> {
    let (filtered, relay) = or_done(stages, relay_name, done, branch)?;
    let sink = stages.spawn(sink_name, move || run_sink(sink_name, filtered, sink))?;
    Ok(ConsumerHandles { relay, sink })
}

fn run_sink<S: Sink>(
    name: &'static str,
    input: Sequence<Event>,
    mut sink: S,
) -> ConsumerReport<S::Report> {
    let timer = StageTimer::start();
    let mut counters = StageCounters::default();

    for event in input.iter() {
        counters.add_received();
        sink.accept(event);
    }

    let tag = sink.tag();
    let report = sink.finish();
    info!("[{}] {} pipeline shut down.", tag, name);

    ConsumerReport {
        // Cancellation is recorded by the relay in front.
        stage: StageReport::new(name, Stage::Sink, counters, false, timer),
        report,
    }
}

/// Feed `events` to `sink` on the calling thread.
pub fn consume<S: Sink>(mut sink: S, events: impl IntoIterator<Item = Event>) -> S::Report {
    for event in events {
        sink.accept(event);
    }
    sink.finish()
}
