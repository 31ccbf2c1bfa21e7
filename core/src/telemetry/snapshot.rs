// ## src/telemetry/snapshot.rs

//! Stage and pipeline reports.
//!
//! - `StageReport` is what every stage thread returns on exit.
//! - `PipelineReport` is the immutable snapshot assembled by the driver once
//!   every stage has exited.

use std::fmt::Write as _;
use std::time::Duration;

use serde::Serialize;

use crate::sink::{AggregateReport, ThresholdReport};
use crate::telemetry::counters::StageCounters;
use crate::telemetry::timers::{Stage, StageTimer, StageTimes};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub name: &'static str,
    pub stage: Stage,
    pub counters: StageCounters,
    /// The stage stopped because it observed cancellation, not because its
    /// input ended.
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn new(
        name: &'static str,
        stage: Stage,
        counters: StageCounters,
        cancelled: bool,
        mut timer: StageTimer,
    ) -> Self {
        timer.finish();
        Self {
            name,
            stage,
            counters,
            cancelled,
            elapsed: timer.elapsed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Reports in wiring order: source, tee, relays, sinks.
    pub stages: Vec<StageReport>,
    pub fraud: ThresholdReport,
    pub analytics: AggregateReport,
    /// The driver fired cancellation while stages were still running.
    pub cancelled: bool,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl PipelineReport {
    pub fn new(
        stages: Vec<StageReport>,
        fraud: ThresholdReport,
        analytics: AggregateReport,
        cancelled: bool,
        elapsed: Duration,
    ) -> Self {
        let mut stage_times = StageTimes::default();
        for report in &stages {
            stage_times.add(report.stage, report.elapsed);
        }
        Self {
            stages,
            fraud,
            analytics,
            cancelled,
            elapsed,
            stage_times,
        }
    }

    pub fn stage(&self, name: &str) -> Option<&StageReport> {
        self.stages.iter().find(|r| r.name == name)
    }

    /// Items abandoned mid-handoff across all relays.
    pub fn dropped_on_shutdown(&self) -> u64 {
        self.totals().dropped_on_shutdown
    }

    /// Counters summed over every stage.
    pub fn totals(&self) -> StageCounters {
        let mut totals = StageCounters::default();
        for report in &self.stages {
            totals.merge(&report.counters);
        }
        totals
    }

    /// Human-readable multi-line summary for logs.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let totals = self.totals();
        let _ = writeln!(
            out,
            "cancelled={} elapsed={:.2?} handoffs={} dropped_on_shutdown={} branches_closed={}",
            self.cancelled,
            self.elapsed,
            totals.emitted,
            totals.dropped_on_shutdown,
            totals.branches_closed
        );
        for r in &self.stages {
            let _ = writeln!(
                out,
                "  {:<22} {:<9} in={:<5} out={:<5} cancelled={} ({:.2?})",
                r.name, r.stage, r.counters.received, r.counters.emitted, r.cancelled, r.elapsed
            );
        }
        for (stage, dur) in &self.stage_times {
            let _ = writeln!(out, "  total {:<9} {:.2?}", stage, dur);
        }
        let _ = writeln!(out, "  total stage time {:.2?}", self.stage_times.total());
        let _ = write!(
            out,
            "  flagged={} normal={} average={}",
            self.fraud.flagged,
            self.fraud.normal,
            self.analytics
                .average
                .map_or_else(|| "n/a".to_string(), |avg| avg.to_string())
        );
        out
    }
}
