// ### `src/telemetry/counters.rs`

//! telemetry/counters.rs
//! Mutable counters owned by a single stage while it runs.
//!
//! Summary: counts items in, items out, shutdown drops, and closed branches.
//! Converted into a `StageReport` when the stage exits.
use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounters {
    /// Items taken from the input (or generated, for the source).
    pub received: u64,
    /// Successful handoffs downstream. For a fan-out, one per branch.
    pub emitted: u64,
    /// Items already received but abandoned because cancellation fired
    /// mid-handoff. At most one per relay.
    pub dropped_on_shutdown: u64,
    /// Fan-out branches whose consumer disconnected.
    pub branches_closed: u64,
}

impl StageCounters {
    pub fn add_received(&mut self) {
        self.received += 1;
    }

    pub fn add_emitted(&mut self, n: u64) {
        self.emitted += n;
    }

    /// Record the in-flight item abandoned at shutdown.
    pub fn add_dropped(&mut self) {
        self.dropped_on_shutdown += 1;
    }

    pub fn add_branch_closed(&mut self) {
        self.branches_closed += 1;
    }

    pub fn merge(&mut self, other: &StageCounters) {
        self.received += other.received;
        self.emitted += other.emitted;
        self.dropped_on_shutdown += other.dropped_on_shutdown;
        self.branches_closed += other.branches_closed;
    }
}
