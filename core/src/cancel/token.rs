// # 📂 `src/cancel/token.rs`

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Broadcastable one-shot shutdown signal.
///
/// Firing drops the only `Sender` of an internal channel. Every `Receiver`
/// clone then reports disconnection forever, which is what makes the
/// wake-up impossible to miss: a reader that starts waiting after the fire
/// returns immediately, a reader already parked is woken by the disconnect.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

struct Inner {
    fired: AtomicBool,
    signal: Receiver<()>,
    state: Mutex<State>,
}

struct State {
    trigger: Option<Sender<()>>,
    children: Vec<Weak<Inner>>,
}

impl Inner {
    fn new() -> Self {
        let (trigger, signal) = bounded::<()>(0);
        Self {
            fired: AtomicBool::new(false),
            signal,
            state: Mutex::new(State {
                trigger: Some(trigger),
                children: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn fire(&self) -> bool {
        let children = {
            let mut state = self.lock();
            if self.fired.swap(true, Ordering::SeqCst) {
                return false;
            }
            // Flag is set before the disconnect becomes observable.
            state.trigger.take();
            std::mem::take(&mut state.children)
        };

        for child in children.iter().filter_map(Weak::upgrade) {
            child.fire();
        }
        true
    }
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::new()),
        }
    }

    /// ARMED → FIRED. Returns `true` only for the call that performed the
    /// transition; later calls are no-ops.
    pub fn fire(&self) -> bool {
        self.inner.fire()
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::SeqCst)
    }

    /// Block until the token fires.
    pub fn wait(&self) {
        // No message is ever sent, so this only returns on disconnect.
        let _ = self.inner.signal.recv();
    }

    /// Block for at most `timeout`. Returns whether the token fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.inner.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_fired(),
        }
    }

    /// Block until `deadline`. Returns whether the token fired.
    pub fn wait_deadline(&self, deadline: Instant) -> bool {
        match self.inner.signal.recv_deadline(deadline) {
            Err(RecvTimeoutError::Disconnected) => true,
            _ => self.is_fired(),
        }
    }

    /// Receiver that becomes ready (disconnected) once the token fires.
    ///
    /// Meant for `select!` next to channel operations:
    ///
    /// ```ignore
    /// select! {
    ///     recv(token.readiness()) -> _ => { /* cancelled */ }
    ///     recv(input) -> msg => { /* item or exhaustion */ }
    /// }
    /// ```
    pub fn readiness(&self) -> &Receiver<()> {
        &self.inner.signal
    }

    /// Token that fires with this one, or on its own.
    /// Firing the child never fires the parent.
    pub fn child(&self) -> CancellationToken {
        let child = CancellationToken::new();
        let mut state = self.inner.lock();
        if self.is_fired() {
            drop(state);
            child.fire();
        } else {
            state.children.retain(|weak| weak.strong_count() > 0);
            state.children.push(Arc::downgrade(&child.inner));
        }
        child
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationToken")
            .field("fired", &self.is_fired())
            .finish()
    }
}
