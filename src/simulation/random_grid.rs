//! Synthetic return grids for testing and benchmarking the optimiser.

use crate::core::return_grid::{GridError, ReturnGrid};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for generating a random return grid.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Tenors to include, in months. Sorted and deduplicated on generation.
    pub tenors: Vec<u32>,
    /// Horizon length in months.
    pub num_months: usize,
    /// Lowest monthly-equivalent return.
    pub min_return: f64,
    /// Highest monthly-equivalent return.
    pub max_return: f64,
    /// Fixed seed for reproducible grids.
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tenors: vec![1, 3, 6, 12],
            num_months: 24,
            min_return: -0.002,
            max_return: 0.006,
            seed: None,
        }
    }
}

/// Generate a random return grid.
///
/// Each return is drawn as a monthly rate and scaled by the tenor, so a
/// 6-month bond pays roughly six months' worth of return.
pub fn generate_random_grid(config: &GridConfig) -> Result<ReturnGrid, GridError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut tenors = config.tenors.clone();
    tenors.sort_unstable();
    tenors.dedup();

    let (lo, hi) = if config.min_return <= config.max_return {
        (config.min_return, config.max_return)
    } else {
        (config.max_return, config.min_return)
    };

    let mut returns = Vec::with_capacity(tenors.len() * config.num_months);
    for &tenor in &tenors {
        for _ in 0..config.num_months {
            let monthly = if lo == hi { lo } else { rng.gen_range(lo..hi) };
            returns.push(monthly * tenor as f64);
        }
    }

    ReturnGrid::new(tenors, config.num_months, returns)
}
