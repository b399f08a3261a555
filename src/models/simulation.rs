//! Shared Monte Carlo machinery
//!
//! Paths are split into fixed-size chunks. Chunk `c` draws from stream `c` of
//! a ChaCha8 generator keyed by one base seed, so a fixed seed reproduces the
//! same estimate whatever the thread count. Chunks run on the rayon pool and
//! are reduced in chunk order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{PricerError, PricerResult};

/// Paths simulated by one task
pub const PATHS_PER_CHUNK: usize = 2048;

/// Source of the base seed for a simulation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Fresh OS-seeded entropy on every run
    #[default]
    Entropy,
    /// Same draws on every run
    Fixed(u64),
}

impl SeedPolicy {
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or(SeedPolicy::Entropy, SeedPolicy::Fixed)
    }

    pub fn base_seed(&self) -> u64 {
        match self {
            SeedPolicy::Entropy => rand::random(),
            SeedPolicy::Fixed(seed) => *seed,
        }
    }
}

/// Discounted mean payoff with its standard error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct McEstimate {
    pub price: f64,
    pub std_error: f64,
    pub num_paths: usize,
}

impl McEstimate {
    /// Symmetric interval `price ± z·std_error`
    pub fn confidence_interval(&self, z: f64) -> (f64, f64) {
        (self.price - z * self.std_error, self.price + z * self.std_error)
    }
}

/// Generator for chunk `chunk` of a run keyed by `base_seed`
pub(crate) fn chunk_rng(base_seed: u64, chunk: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    rng.set_stream(chunk as u64);
    rng
}

#[inline]
pub(crate) fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    Distribution::<f64>::sample(&StandardNormal, rng)
}

/// Run `f(rng, paths_in_chunk)` for every chunk in parallel, results in chunk order
pub(crate) fn map_chunks<T, F>(num_paths: usize, base_seed: u64, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&mut ChaCha8Rng, usize) -> T + Sync + Send,
{
    let num_chunks = num_paths.div_ceil(PATHS_PER_CHUNK);
    (0..num_chunks)
        .into_par_iter()
        .map(|chunk| {
            let start = chunk * PATHS_PER_CHUNK;
            let len = PATHS_PER_CHUNK.min(num_paths - start);
            let mut rng = chunk_rng(base_seed, chunk);
            f(&mut rng, len)
        })
        .collect()
}

/// Discounted mean of `payoff(terminal(rng))` over `num_paths` independent paths
pub(crate) fn estimate<P, F>(
    num_paths: usize,
    base_seed: u64,
    discount: f64,
    payoff: P,
    terminal: F,
) -> PricerResult<McEstimate>
where
    P: Fn(f64) -> f64 + Sync + Send,
    F: Fn(&mut ChaCha8Rng) -> f64 + Sync + Send,
{
    if num_paths == 0 {
        return Err(PricerError::invalid_input("number of simulations must be >= 1"));
    }

    let sums = map_chunks(num_paths, base_seed, |rng, len| {
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for _ in 0..len {
            let x = payoff(terminal(rng));
            sum += x;
            sum_sq += x * x;
        }
        (sum, sum_sq)
    });

    let (sum, sum_sq) = sums
        .into_iter()
        .fold((0.0, 0.0), |acc, s| (acc.0 + s.0, acc.1 + s.1));

    let n = num_paths as f64;
    let mean = sum / n;
    let variance = if num_paths > 1 {
        ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
    } else {
        0.0
    };

    let price = discount * mean;
    if !price.is_finite() {
        return Err(PricerError::numerical("simulated payoff is not finite"));
    }

    Ok(McEstimate {
        price,
        std_error: discount * (variance / n).sqrt(),
        num_paths,
    })
}
