/// One sort worker: scan, partition, local sort, rendezvous, write.
use std::fs::File;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::core::SortError;
use super::file::{VALUE_LEN, encode_values, write_full_at};
use crate::sync::Barrier;

/// Above this many elements the local sort goes through rayon.
const PAR_SORT_THRESHOLD: usize = 10_000;

/// Per-partition element counts, one write-once slot per worker.
///
/// Slot `i` is stored by worker `i` before the barrier and read by all
/// workers after it. Relaxed suffices on both sides: the barrier's
/// mutex hand-off is the acquire/release edge that orders every store
/// before every load.
pub struct SizeTable {
    slots: Box<[AtomicUsize]>,
}

impl SizeTable {
    pub fn new(partitions: usize) -> Self {
        let slots = (0..partitions).map(|_| AtomicUsize::new(0)).collect();
        SizeTable { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn record(&self, index: usize, count: usize) {
        self.slots[index].store(count, Ordering::Relaxed);
    }

    pub fn get(&self, index: usize) -> usize {
        self.slots[index].load(Ordering::Relaxed)
    }

    /// Sum of the counts of all lower-indexed partitions — the number
    /// of values that land before partition `index` in the output.
    pub fn values_before(&self, index: usize) -> usize {
        self.slots[..index]
            .iter()
            .map(|s| s.load(Ordering::Relaxed))
            .sum()
    }
}

/// Everything one worker needs, moved into its thread at spawn.
/// Exactly one thread consumes each task; the spawning side keeps no
/// access after hand-off.
pub(crate) struct WorkerTask<'a> {
    pub index: usize,
    pub values: &'a [f32],
    pub bounds: &'a [f32],
    pub sizes: &'a SizeTable,
    pub barrier: &'a Barrier,
    pub out: &'a File,
    pub header_len: u64,
    pub verbose: bool,
}

/// Poisons the barrier if the worker dies before completing its
/// rendezvous, so the surviving workers error out instead of blocking
/// forever. Disarmed once the barrier round is over.
struct AbortGuard<'a> {
    barrier: &'a Barrier,
    armed: bool,
}

impl<'a> AbortGuard<'a> {
    fn new(barrier: &'a Barrier) -> Self {
        AbortGuard { barrier, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.barrier.abort();
        }
    }
}

impl WorkerTask<'_> {
    /// Run this worker to completion.
    ///
    /// Phase 1 (pre-barrier): collect the values in this partition's
    /// range, record the count, sort locally. Phase 2 (post-barrier):
    /// every count is now visible, so the prefix sum gives this
    /// partition's byte offset; write the sorted values there. The two
    /// phases share no mutable state besides the size table, and the
    /// output ranges are disjoint by construction.
    pub fn run(self) -> Result<(), SortError> {
        let guard = AbortGuard::new(self.barrier);

        let lo = self.bounds[self.index];
        let hi = self.bounds[self.index + 1];
        // The top partition claims its upper bound too: its sentinel is
        // +∞, and a strictly-less-than filter would drop an input value
        // equal to it. Every other range stays half-open.
        let last = self.index + 2 == self.bounds.len();

        // Full scan per worker: O(P · n) aggregate, traded for zero
        // coordination during partitioning.
        let mut local: Vec<f32> = self
            .values
            .iter()
            .copied()
            .filter(|&v| lo <= v && (v < hi || (last && v == hi)))
            .collect();

        self.sizes.record(self.index, local.len());

        if self.verbose {
            eprintln!(
                "fpsort: partition {}: start {:.4}, count {}",
                self.index,
                lo,
                local.len()
            );
        }

        sort_values(&mut local);

        self.barrier
            .wait()
            .map_err(|_| SortError::Synchronization { partition: self.index })?;
        guard.disarm();

        let offset = self.header_len
            + (self.sizes.values_before(self.index) * VALUE_LEN) as u64;
        write_full_at(self.out, &encode_values(&local), offset).map_err(|source| {
            SortError::Write { partition: self.index, source }
        })?;

        Ok(())
    }
}

/// Ascending local sort; large partitions go parallel.
fn sort_values(values: &mut [f32]) {
    if values.len() > PAR_SORT_THRESHOLD {
        values.par_sort_unstable_by(|a, b| a.total_cmp(b));
    } else {
        values.sort_unstable_by(|a, b| a.total_cmp(b));
    }
}
