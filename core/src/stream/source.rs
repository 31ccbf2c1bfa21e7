// # 📂 `src/stream/source.rs`

//! Event source: a finite, paced, cancellable generator.

use std::ops::Range;
use std::time::Duration;

use crossbeam::channel::{select, Sender};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::cancel::CancellationToken;
use crate::constants::stage_names;
use crate::stream::sequence::{handoff, Sequence};
use crate::stream::stage::{StageHandle, StageSet};
use crate::telemetry::{Stage, StageCounters, StageReport, StageTimer};
use crate::types::{Event, PipelineError};

/// `count` uniform draws from `range`.
#[derive(Debug, Clone)]
pub struct RandomAmounts {
    rng: StdRng,
    range: Range<Event>,
    remaining: usize,
}

impl RandomAmounts {
    /// `seed = None` draws from OS entropy.
    pub fn new(count: usize, range: Range<Event>, seed: Option<u64>) -> Result<Self, PipelineError> {
        if range.is_empty() {
            return Err(PipelineError::Config(format!(
                "empty value range [{}, {})",
                range.start, range.end
            )));
        }
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Ok(Self {
            rng,
            range,
            remaining: count,
        })
    }
}

impl Iterator for RandomAmounts {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.rng.gen_range(self.range.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RandomAmounts {}

enum Handoff {
    Delivered,
    ConsumerGone,
    Cancelled,
}

/// Spawn the transaction generator: `amounts` paced by `delay`.
pub fn spawn_transaction_generator(
    stages: &StageSet,
    done: &CancellationToken,
    amounts: RandomAmounts,
    delay: Duration,
) -> Result<(Sequence<Event>, StageHandle<StageReport>), PipelineError> {
    spawn_source_from(stages, stage_names::SOURCE, done, amounts, delay)
}

/// Spawn a source stage over any iterator of items.
///
/// After each delivered item the stage pauses for `delay`; the pause is a
/// cancellable wait, so a fired token ends the stage without sleeping out
/// the remaining delay.
pub fn spawn_source_from<T, I>(
    stages: &StageSet,
    name: &'static str,
    done: &CancellationToken,
    items: I,
    delay: Duration,
) -> Result<(Sequence<T>, StageHandle<StageReport>), PipelineError>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let (out_tx, out_rx) = handoff::<T>();
    let done = done.clone();
    let items = items.into_iter();
    let handle = stages.spawn(name, move || run_source(name, &done, items, delay, out_tx))?;
    Ok((out_rx, handle))
}

fn run_source<T>(
    name: &'static str,
    done: &CancellationToken,
    items: impl Iterator<Item = T>,
    delay: Duration,
    out: Sender<T>,
) -> StageReport {
    let timer = StageTimer::start();
    let mut counters = StageCounters::default();
    let cancel = done.readiness();
    let mut cancelled = false;

    for item in items {
        if done.is_fired() {
            cancelled = true;
            break;
        }
        counters.add_received();

        let outcome = select! {
            recv(cancel) -> _ => Handoff::Cancelled,
            send(out, item) -> res => match res {
                Ok(()) => Handoff::Delivered,
                Err(_) => Handoff::ConsumerGone,
            },
        };
        match outcome {
            Handoff::Delivered => {
                counters.add_emitted(1);
                if !delay.is_zero() && done.wait_timeout(delay) {
                    cancelled = true;
                    break;
                }
            }
            Handoff::ConsumerGone => {
                debug!("[SOURCE-{}] consumer disconnected", name);
                cancelled = done.is_fired();
                break;
            }
            Handoff::Cancelled => {
                cancelled = true;
                break;
            }
        }
    }

    drop(out);
    if cancelled {
        info!("[SOURCE-{}] Transaction Generator: Shutting down.", name);
    } else {
        info!("[SOURCE-{}] finished after {} events", name, counters.emitted);
    }
    StageReport::new(name, Stage::Source, counters, cancelled, timer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_amounts_respects_count_and_range() {
        let amounts: Vec<_> = RandomAmounts::new(50, 10..20, Some(7)).unwrap().collect();
        assert_eq!(amounts.len(), 50);
        assert!(amounts.iter().all(|v| (10..20).contains(v)));
    }

    #[test]
    fn same_seed_same_sequence() {
        let a: Vec<_> = RandomAmounts::new(20, 0..1000, Some(42)).unwrap().collect();
        let b: Vec<_> = RandomAmounts::new(20, 0..1000, Some(42)).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_range_is_rejected() {
        assert!(matches!(
            RandomAmounts::new(1, 5..5, None),
            Err(PipelineError::Config(_))
        ));
    }
}
