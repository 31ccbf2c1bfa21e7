//! stream: cancellable stages wired by rendezvous channels.
//!
//! Every stage runs on its own thread, owns exactly one output `Sender`,
//! and ends its output by dropping it. Stages:
//! - `source` : paced generator, observes cancellation
//! - `tee`    : per-item barrier fan-out to every branch
//! - `relay`  : `or_done`, truncates a sequence at cancellation

pub mod sequence;
pub mod stage;
pub mod relay;
pub mod tee;
pub mod source;

pub use sequence::{handoff, Sequence};
pub use stage::{StageHandle, StageSet};
pub use relay::or_done;
pub use tee::{broadcast, tee, TieBreak};
pub use source::{spawn_source_from, spawn_transaction_generator, RandomAmounts};
