/// Pivot sampling: pick the partition boundaries that split the value
/// domain into P ranges of roughly equal population.
use std::fs::File;
use std::io::Read;

/// xorshift64 PRNG. Pivot selection only needs a cheap, seedable
/// source of uniform indices, not cryptographic quality.
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Deterministic generator for a given seed (seed 0 is remapped to
    /// a fixed non-zero constant; xorshift is stuck at zero).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x12345678_9abcdef0 } else { seed };
        Rng { state }
    }

    /// Seed from /dev/urandom, falling back to the clock.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        if let Ok(mut f) = File::open("/dev/urandom") {
            let _ = f.read_exact(&mut buf);
        }
        let mut seed = u64::from_ne_bytes(buf);
        if seed == 0 {
            seed = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x12345678);
        }
        Rng::new(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform-ish index in `[0, n)`. Modulo bias is irrelevant at the
    /// sample sizes involved here.
    pub fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// How many times we re-draw after hitting a value already in the
/// sample before giving up and accepting duplicates. Without a cap,
/// low-diversity input (e.g. all values equal) would spin forever.
const REJECT_BUDGET_PER_SLOT: usize = 64;

/// Select the P+1 partition boundaries for `values`.
///
/// Draws `3·(P−1)` values uniformly at random, preferring distinct
/// ones, sorts them, and keeps every third starting at index 1 as the
/// P−1 internal pivots. Oversampling and taking evenly spaced order
/// statistics approximates a balanced P-way split without sorting the
/// whole input. The result is bracketed by ±∞ so every finite value
/// lands in exactly one half-open range `[bounds[i], bounds[i+1])`
/// regardless of the input's domain.
///
/// Boundaries are non-decreasing. Duplicate pivots (possible when the
/// input has fewer distinct values than the sample wants) produce
/// empty partitions, which stay disjoint under half-open semantics.
pub fn select_bounds(values: &[f32], partitions: usize, rng: &mut Rng) -> Vec<f32> {
    debug_assert!(partitions >= 1 && partitions <= values.len());

    let mut bounds = Vec::with_capacity(partitions + 1);
    bounds.push(f32::NEG_INFINITY);

    if partitions > 1 {
        let oversample = 3 * (partitions - 1);
        let mut sample: Vec<f32> = Vec::with_capacity(oversample);
        let mut budget = oversample * REJECT_BUDGET_PER_SLOT;

        while sample.len() < oversample {
            let v = values[rng.below(values.len())];
            if budget > 0 && sample.contains(&v) {
                budget -= 1;
                continue;
            }
            sample.push(v);
        }

        sample.sort_unstable_by(|a, b| a.total_cmp(b));
        for i in (1..oversample).step_by(3) {
            bounds.push(sample[i]);
        }
    }

    bounds.push(f32::INFINITY);
    debug_assert_eq!(bounds.len(), partitions + 1);
    bounds
}
