// # 📂 `src/stream/tee.rs`

//! Broadcast splitter.
//!
//! Every item is handed to every live branch before the next item is read
//! from the source (per-item barrier). Within an item, whichever branch is
//! ready first is served first; the stage then blocks only on the branches
//! still missing that item. Order within a branch equals source order.
//!
//! The splitter has no cancellation input. A branch whose receiver was
//! dropped is removed from the fan-out; once every branch is gone the
//! splitter stops reading, which in turn releases its upstream.

use crossbeam::channel::{Receiver, Select, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::stream::sequence::{handoff, Sequence};
use crate::stream::stage::{StageHandle, StageSet};
use crate::telemetry::{Stage, StageCounters, StageReport, StageTimer};
use crate::types::PipelineError;

/// Which branch gets an item first when several are ready at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Let the readiness primitive pick among ready branches (random).
    #[default]
    Arbitrary,
    /// Serve ready branches in branch order.
    InOrder,
}

/// Split `input` into two full copies.
pub fn tee<T>(
    stages: &StageSet,
    name: &'static str,
    input: Receiver<T>,
    tie_break: TieBreak,
) -> Result<(Sequence<T>, Sequence<T>, StageHandle<StageReport>), PipelineError>
where
    T: Clone + Send + 'static,
{
    let (tx1, rx1) = handoff::<T>();
    let (tx2, rx2) = handoff::<T>();
    let handle = spawn_fan_out(stages, name, input, vec![tx1, tx2], tie_break)?;
    Ok((rx1, rx2, handle))
}

/// Split `input` into `branches` full copies (`branches >= 1`).
pub fn broadcast<T>(
    stages: &StageSet,
    name: &'static str,
    input: Receiver<T>,
    branches: usize,
    tie_break: TieBreak,
) -> Result<(Vec<Sequence<T>>, StageHandle<StageReport>), PipelineError>
where
    T: Clone + Send + 'static,
{
    if branches == 0 {
        return Err(PipelineError::Config(format!(
            "broadcast `{}` needs at least one branch",
            name
        )));
    }
    let (senders, receivers): (Vec<_>, Vec<_>) = (0..branches).map(|_| handoff::<T>()).unzip();
    let handle = spawn_fan_out(stages, name, input, senders, tie_break)?;
    Ok((receivers, handle))
}

fn spawn_fan_out<T>(
    stages: &StageSet,
    name: &'static str,
    input: Receiver<T>,
    outputs: Vec<Sender<T>>,
    tie_break: TieBreak,
) -> Result<StageHandle<StageReport>, PipelineError>
where
    T: Clone + Send + 'static,
{
    debug!("[TEE-{}] fan-out over {} branches", name, outputs.len());
    stages.spawn(name, move || run_fan_out(name, input, outputs, tie_break))
}

fn run_fan_out<T: Clone>(
    name: &'static str,
    input: Receiver<T>,
    outputs: Vec<Sender<T>>,
    tie_break: TieBreak,
) -> StageReport {
    let timer = StageTimer::start();
    let mut counters = StageCounters::default();
    let mut branches: Vec<Option<Sender<T>>> = outputs.into_iter().map(Some).collect();

    for item in input.iter() {
        counters.add_received();
        deliver(name, &mut branches, &item, tie_break, &mut counters);

        if branches.iter().all(Option::is_none) {
            debug!("[TEE-{}] every branch disconnected, stop reading", name);
            break;
        }
    }

    // 🔥 ends every output together
    drop(branches);
    drop(input);
    info!(
        "[TEE-{}] stopped (items={}, handoffs={})",
        name, counters.received, counters.emitted
    );
    StageReport::new(name, Stage::Broadcast, counters, false, timer)
}

/// Hand one item to every live branch, ready branches first.
fn deliver<T: Clone>(
    name: &'static str,
    branches: &mut [Option<Sender<T>>],
    item: &T,
    tie_break: TieBreak,
    counters: &mut StageCounters,
) {
    let mut pending: Vec<usize> = branches
        .iter()
        .enumerate()
        .filter_map(|(i, b)| b.as_ref().map(|_| i))
        .collect();

    while !pending.is_empty() {
        if tie_break == TieBreak::InOrder {
            let mut closed = Vec::new();
            pending.retain(|&i| {
                let Some(tx) = branches[i].as_ref() else {
                    return false;
                };
                match tx.try_send(item.clone()) {
                    Ok(()) => {
                        counters.add_emitted(1);
                        false
                    }
                    Err(TrySendError::Full(_)) => true,
                    Err(TrySendError::Disconnected(_)) => {
                        closed.push(i);
                        false
                    }
                }
            });
            for i in closed {
                close_branch(name, branches, i, counters);
            }
            if pending.is_empty() {
                break;
            }
        }

        // Block until any pending branch takes the item.
        let (branch, sent) = {
            let ready: Vec<(usize, &Sender<T>)> = pending
                .iter()
                .filter_map(|&i| branches[i].as_ref().map(|tx| (i, tx)))
                .collect();
            if ready.is_empty() {
                break;
            }
            let mut sel = Select::new();
            for &(_, tx) in &ready {
                sel.send(tx);
            }
            let op = sel.select();
            let (branch, tx) = ready[op.index()];
            (branch, op.send(tx, item.clone()).is_ok())
        };

        pending.retain(|&i| i != branch);
        if sent {
            counters.add_emitted(1);
        } else {
            close_branch(name, branches, branch, counters);
        }
    }
}

fn close_branch<T>(
    name: &'static str,
    branches: &mut [Option<Sender<T>>],
    branch: usize,
    counters: &mut StageCounters,
) {
    if branches[branch].take().is_some() {
        counters.add_branch_closed();
        debug!("[TEE-{}] branch {} disconnected", name, branch);
    }
}
