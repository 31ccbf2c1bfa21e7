// # 📂 `src/stream/relay.rs`

//! `or_done`: cancellation-aware pass-through.
//!
//! Output is a strict, in-order prefix of the input:
//! - no cancellation → every item, exactly once
//! - cancellation while waiting on the input → stop, nothing more forwarded
//! - cancellation while handing an item downstream → that one item is
//!   abandoned (counted as `dropped_on_shutdown`), then stop

use crossbeam::channel::{select, Receiver, Sender};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::stream::sequence::{handoff, Sequence};
use crate::stream::stage::{StageHandle, StageSet};
use crate::telemetry::{Stage, StageCounters, StageReport, StageTimer};
use crate::types::PipelineError;

enum Pull<T> {
    Item(T),
    Exhausted,
    Cancelled,
}

enum Push {
    Delivered,
    ConsumerGone,
    Cancelled,
}

/// Spawn a relay over `input` that stops when `done` fires.
pub fn or_done<T>(
    stages: &StageSet,
    name: &'static str,
    done: &CancellationToken,
    input: Receiver<T>,
) -> Result<(Sequence<T>, StageHandle<StageReport>), PipelineError>
where
    T: Send + 'static,
{
    let (out_tx, out_rx) = handoff::<T>();
    let done = done.clone();
    let handle = stages.spawn(name, move || run_relay(name, &done, &input, out_tx))?;
    Ok((out_rx, handle))
}

fn run_relay<T>(
    name: &'static str,
    done: &CancellationToken,
    input: &Receiver<T>,
    out: Sender<T>,
) -> StageReport {
    let timer = StageTimer::start();
    let mut counters = StageCounters::default();
    let cancel = done.readiness();
    let mut cancelled = false;

    loop {
        // A fired token wins over a ready input.
        if done.is_fired() {
            cancelled = true;
            break;
        }

        let pulled = select! {
            recv(cancel) -> _ => Pull::Cancelled,
            recv(input) -> msg => match msg {
                Ok(item) => Pull::Item(item),
                Err(_) => Pull::Exhausted,
            },
        };
        let item = match pulled {
            Pull::Item(item) => item,
            Pull::Exhausted => {
                // Upstream may have closed because the token fired.
                cancelled = done.is_fired();
                debug!("[RELAY-{}] input exhausted (cancelled={})", name, cancelled);
                break;
            }
            Pull::Cancelled => {
                cancelled = true;
                break;
            }
        };
        counters.add_received();

        let pushed = select! {
            send(out, item) -> res => match res {
                Ok(()) => Push::Delivered,
                Err(_) => Push::ConsumerGone,
            },
            recv(cancel) -> _ => Push::Cancelled,
        };
        match pushed {
            Push::Delivered => counters.add_emitted(1),
            Push::ConsumerGone => {
                debug!("[RELAY-{}] consumer disconnected", name);
                break;
            }
            Push::Cancelled => {
                counters.add_dropped();
                debug!("[RELAY-{}] abandoned in-flight item on cancellation", name);
                cancelled = true;
                break;
            }
        }
    }

    // ✅ close output before reporting
    drop(out);
    info!(
        "[RELAY-{}] stopped (forwarded={}, cancelled={})",
        name, counters.emitted, cancelled
    );
    StageReport::new(name, Stage::Relay, counters, cancelled, timer)
}
