/// Sample-sort orchestration.
///
/// The coordinator samples pivots, spawns one worker per partition,
/// and joins them all. The single ordering point is the barrier inside
/// the workers: every partition count is recorded before any worker
/// computes its output offset from the count table.
use std::fs::File;
use std::io;
use std::path::Path;
use std::thread;

use thiserror::Error;

use super::file::{self, HEADER_LEN};
use super::sample::{Rng, select_bounds};
use super::worker::{SizeTable, WorkerTask};
use crate::sync::Barrier;

/// Configuration for one sort run.
#[derive(Debug, Clone)]
pub struct SortConfig {
    /// Number of partitions / worker threads.
    pub partitions: usize,
    /// Seed for pivot sampling; 0 means seed from the OS.
    pub random_seed: u64,
    /// Print per-partition range and count to stderr.
    pub verbose: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            partitions: 1,
            random_seed: 0,
            verbose: false,
        }
    }
}

/// What failed, and in which phase.
#[derive(Debug, Error)]
pub enum SortError {
    /// Rejected before any worker is spawned.
    #[error("invalid partition count {partitions}: must be between 1 and {len} (the input length)")]
    InvalidPartitions { partitions: usize, len: usize },

    #[error("cannot read {path}: {}", crate::common::io_error_msg(.source))]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot create {path}: {}", crate::common::io_error_msg(.source))]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A peer worker died before the rendezvous, so this worker's
    /// barrier wait was aborted instead of deadlocking.
    #[error("partition {partition}: synchronization aborted by a failed peer")]
    Synchronization { partition: usize },

    #[error("partition {partition}: output write failed: {source}")]
    Write {
        partition: usize,
        #[source]
        source: io::Error,
    },

    #[error("partition {partition} panicked")]
    Panicked { partition: usize },
}

/// Sort `values` into the payload region of `dest`.
///
/// `dest` must already be sized to `header_len + 4·values.len()` bytes
/// with its header written; the workers only touch the payload. On
/// error the payload is left in whatever partial state the run
/// produced — the caller learns about it through the returned error.
///
/// All workers are always joined before returning; the first failure
/// (by partition index) wins.
pub fn sample_sort(
    values: &[f32],
    config: &SortConfig,
    dest: &File,
    header_len: u64,
) -> Result<(), SortError> {
    let partitions = config.partitions;
    if partitions == 0 || partitions > values.len() {
        return Err(SortError::InvalidPartitions {
            partitions,
            len: values.len(),
        });
    }

    let mut rng = if config.random_seed != 0 {
        Rng::new(config.random_seed)
    } else {
        Rng::from_entropy()
    };
    let bounds = select_bounds(values, partitions, &mut rng);
    let sizes = SizeTable::new(partitions);
    let barrier = Barrier::new(partitions);

    let results: Vec<Result<(), SortError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..partitions)
            .map(|index| {
                let task = WorkerTask {
                    index,
                    values,
                    bounds: &bounds,
                    sizes: &sizes,
                    barrier: &barrier,
                    out: dest,
                    header_len,
                    verbose: config.verbose,
                };
                s.spawn(move || task.run())
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(partition, handle)| {
                handle
                    .join()
                    .unwrap_or(Err(SortError::Panicked { partition }))
            })
            .collect()
    });

    for result in results {
        result?;
    }
    Ok(())
}

/// End-to-end driver: read `input`, write its values to `output` in
/// ascending order. Returns the number of values sorted.
///
/// An empty input (count 0) produces a header-only output without
/// spawning any workers.
pub fn sort_file(input: &Path, output: &Path, config: &SortConfig) -> Result<u64, SortError> {
    let values = file::read_values(input).map_err(|source| SortError::Input {
        path: input.display().to_string(),
        source,
    })?;

    // A zero partition count is a configuration error no matter what
    // the input holds, including an empty file.
    if config.partitions == 0 {
        return Err(SortError::InvalidPartitions {
            partitions: config.partitions,
            len: values.len(),
        });
    }

    let count = values.len() as u64;
    let dest = file::create_output(output, count).map_err(|source| SortError::Output {
        path: output.display().to_string(),
        source,
    })?;

    if values.is_empty() {
        return Ok(0);
    }

    sample_sort(&values, config, &dest, HEADER_LEN)?;
    Ok(count)
}
