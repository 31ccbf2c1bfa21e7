// # 📂 `src/stream/stage.rs`

//! Stage threads and exit tracking.
//!
//! `StageSet` spawns named stage threads and lets the driver wait, with a
//! deadline, until every one of them has exited. A thread posts its name
//! on exit from a drop guard, so a panicking stage is still accounted for
//! and shows up as `StagePanicked` on join instead of as a stall.

use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam::channel::{unbounded, Receiver, Sender};

use crate::types::PipelineError;

/// Join handle of one stage thread.
#[derive(Debug)]
pub struct StageHandle<R> {
    name: &'static str,
    handle: JoinHandle<R>,
}

impl<R> StageHandle<R> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<R, PipelineError> {
        self.handle
            .join()
            .map_err(|_| PipelineError::StagePanicked(self.name))
    }
}

struct ExitGuard {
    name: &'static str,
    tx: Sender<&'static str>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(self.name);
    }
}

#[derive(Default)]
struct Tracker {
    spawned: Vec<&'static str>,
    exited: Vec<&'static str>,
}

impl Tracker {
    fn pending(&self) -> Vec<&'static str> {
        let mut pending = self.spawned.clone();
        for name in &self.exited {
            if let Some(pos) = pending.iter().position(|p| p == name) {
                pending.remove(pos);
            }
        }
        pending
    }
}

/// Set of stage threads belonging to one pipeline.
pub struct StageSet {
    exit_tx: Sender<&'static str>,
    exit_rx: Receiver<&'static str>,
    tracker: Mutex<Tracker>,
}

impl StageSet {
    pub fn new() -> Self {
        let (exit_tx, exit_rx) = unbounded();
        Self {
            exit_tx,
            exit_rx,
            tracker: Mutex::new(Tracker::default()),
        }
    }

    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn `f` on a named thread that reports its exit to this set.
    pub fn spawn<F, R>(&self, name: &'static str, f: F) -> Result<StageHandle<R>, PipelineError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let tx = self.exit_tx.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _guard = ExitGuard { name, tx };
                f()
            })
            .map_err(|source| PipelineError::Spawn { stage: name, source })?;

        self.tracker().spawned.push(name);
        Ok(StageHandle { name, handle })
    }

    /// Names of stages that have not exited yet.
    pub fn pending(&self) -> Vec<&'static str> {
        let mut tracker = self.tracker();
        tracker.exited.extend(self.exit_rx.try_iter());
        tracker.pending()
    }

    /// Wait until every spawned stage has exited or `deadline` passes.
    /// On timeout the still-running stages are returned in the error.
    pub fn wait_all(&self, deadline: Instant) -> Result<(), PipelineError> {
        loop {
            let pending = self.pending();
            if pending.is_empty() {
                return Ok(());
            }
            match self.exit_rx.recv_deadline(deadline) {
                Ok(name) => self.tracker().exited.push(name),
                Err(_) => {
                    let stalled = self.pending();
                    if stalled.is_empty() {
                        return Ok(());
                    }
                    return Err(PipelineError::ShutdownTimeout { stalled });
                }
            }
        }
    }
}

impl Default for StageSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn wait_all_sees_finished_stages() {
        let stages = StageSet::new();
        let a = stages.spawn("a", || 1).unwrap();
        let b = stages.spawn("b", || 2).unwrap();
        stages
            .wait_all(Instant::now() + Duration::from_secs(5))
            .unwrap();
        assert_eq!(a.join().unwrap() + b.join().unwrap(), 3);
        assert!(stages.pending().is_empty());
    }

    #[test]
    fn wait_all_reports_stalled_stage() {
        let stages = StageSet::new();
        let (release_tx, release_rx) = crossbeam::channel::bounded::<()>(0);
        let handle = stages
            .spawn("stuck", move || {
                let _ = release_rx.recv();
            })
            .unwrap();

        let err = stages
            .wait_all(Instant::now() + Duration::from_millis(20))
            .unwrap_err();
        match err {
            PipelineError::ShutdownTimeout { stalled } => assert_eq!(stalled, vec!["stuck"]),
            other => panic!("unexpected error: {other}"),
        }

        drop(release_tx);
        handle.join().unwrap();
    }

    #[test]
    fn panicking_stage_is_not_a_stall() {
        let stages = StageSet::new();
        let handle = stages.spawn("boom", || -> u32 { panic!("stage failure") }).unwrap();
        stages
            .wait_all(Instant::now() + Duration::from_secs(5))
            .unwrap();
        assert!(matches!(handle.join(), Err(PipelineError::StagePanicked("boom"))));
    }
}
