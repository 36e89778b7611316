/// Rendezvous barrier for a fixed set of worker threads.
///
/// Differs from `std::sync::Barrier` in one way that matters here: it
/// can be aborted. A worker that fails before arriving would otherwise
/// leave its peers blocked forever, so any thread may poison the
/// barrier and release everyone with an error instead.
use std::sync::{Condvar, Mutex};

/// Returned from [`Barrier::wait`] when the barrier was aborted before
/// (or while) this round completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierAborted;

impl std::fmt::Display for BarrierAborted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("barrier aborted before all parties arrived")
    }
}

impl std::error::Error for BarrierAborted {}

struct BarrierState {
    /// Arrivals in the current round. Only ever touched under the lock;
    /// the release of the mutex is what makes pre-wait writes visible
    /// to every thread that leaves the barrier.
    arrived: usize,
    /// Bumped once per completed round, which both releases the current
    /// waiters and makes the barrier reusable for the next round.
    generation: u64,
    aborted: bool,
}

/// A cyclic rendezvous point expecting a fixed number of parties.
pub struct Barrier {
    state: Mutex<BarrierState>,
    condv: Condvar,
    parties: usize,
}

impl Barrier {
    /// Create a barrier that releases once `parties` threads have
    /// called [`wait`](Self::wait).
    ///
    /// # Panics
    /// Panics if `parties` is zero.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "barrier needs at least one party");
        Barrier {
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            condv: Condvar::new(),
            parties,
        }
    }

    /// Number of threads this barrier expects per round.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Register one arrival and block until all parties have arrived,
    /// then release every waiter together.
    ///
    /// The arrival count is incremented under the mutex, so concurrent
    /// arrivals cannot race, and the mutex hand-off gives every
    /// released thread an acquire view of everything its peers wrote
    /// before their own `wait` call.
    ///
    /// Returns `Err(BarrierAborted)` if [`abort`](Self::abort) was
    /// called, now or earlier. A poisoned mutex (a peer panicked while
    /// holding it) is reported the same way.
    pub fn wait(&self) -> Result<(), BarrierAborted> {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(_) => return Err(BarrierAborted),
        };
        if state.aborted {
            return Err(BarrierAborted);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            // Last arrival: reset for the next round and release everyone.
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.condv.notify_all();
            return Ok(());
        }

        let round = state.generation;
        while state.generation == round && !state.aborted {
            state = match self.condv.wait(state) {
                Ok(guard) => guard,
                Err(_) => return Err(BarrierAborted),
            };
        }

        if state.aborted {
            Err(BarrierAborted)
        } else {
            Ok(())
        }
    }

    /// Poison the barrier: all current waiters wake with
    /// `Err(BarrierAborted)` and every future [`wait`](Self::wait)
    /// fails immediately. Idempotent.
    pub fn abort(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.aborted = true;
        drop(state);
        self.condv.notify_all();
    }
}
