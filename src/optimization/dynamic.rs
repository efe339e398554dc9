use crate::core::action::{format_path, InvestmentAction};
use crate::core::return_grid::ReturnGrid;
use crate::optimization::frontier::FrontierQueue;
use crate::optimization::history::CrfHistory;
use crate::optimization::path_count::{count_paths, PathCount};
use crate::optimization::reconstruct::reconstruct_paths;
use crate::optimization::trellis::{Decision, DecisionTrellis};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which finite limit a compounded CRF breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowDirection {
    Positive,
    Negative,
}

impl fmt::Display for OverflowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowDirection::Positive => write!(f, "exceeding finite limit ({:.3e})", f64::MAX),
            OverflowDirection::Negative => write!(f, "below finite limit ({:.3e})", f64::MIN),
        }
    }
}

/// Errors arising from the multi-result optimiser.
#[derive(Debug, Error, PartialEq)]
pub enum OptimiserError {
    #[error("cannot request a negative number of results, got {0}")]
    NegativeResultCount(i64),
    #[error("return {direction} possible by month {month}")]
    CrfOverflow {
        month: usize,
        direction: OverflowDirection,
    },
    #[error("cannot track {k} results over a {months}-month window: not enough memory")]
    ResultsTooLarge { k: usize, months: usize },
    #[error("no decision recorded for rank {rank} at month {month}")]
    UnreachedRank { month: usize, rank: usize },
}

/// The K best final CRFs and the strategy achieving each.
///
/// `crfs` is non-increasing and `paths[i]` reproduces `crfs[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimalResults {
    pub crfs: Vec<f64>,
    pub paths: Vec<Vec<InvestmentAction>>,
}

impl OptimalResults {
    pub fn len(&self) -> usize {
        self.crfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crfs.is_empty()
    }

    /// Percentage return of the `rank`-th result: `100 * CRF - 100`.
    pub fn percent_return(&self, rank: usize) -> Option<f64> {
        self.crfs.get(rank).map(|crf| 100.0 * crf - 100.0)
    }

    /// Ranked `(crf, path)` pairs, best first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[InvestmentAction])> {
        self.crfs
            .iter()
            .copied()
            .zip(self.paths.iter().map(Vec::as_slice))
    }
}

impl fmt::Display for OptimalResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Optimal Sequences ===")?;
        for (i, (crf, path)) in self.iter().enumerate() {
            writeln!(f, "{}. {:.2}%: {}", i + 1, 100.0 * crf - 100.0, format_path(path))?;
        }
        Ok(())
    }
}

/// Multi-result dynamic programme over a [`ReturnGrid`].
///
/// At every month an investor either buys one bond (and cannot act again
/// until it matures) or waits a month. The optimiser finds the K best
/// cumulative return factors (CRFs) at the final month in a single forward
/// pass, keeping only a rolling window of ranked CRFs plus a full-horizon
/// decision trellis for path reconstruction.
pub struct DynamicOptimiser;

impl DynamicOptimiser {
    /// Validate a signed result count.
    pub fn requested_results(requested: i64) -> Result<usize, OptimiserError> {
        usize::try_from(requested).map_err(|_| OptimiserError::NegativeResultCount(requested))
    }

    /// Compute the `k` best CRFs at the final month and their strategies.
    ///
    /// # Algorithm
    ///
    /// 1. Month 0 holds CRF 1.0 at rank 0.
    /// 2. For each month `m`, merge the wait stream (`history[m-1]`) with one
    ///    stream per tenor `t <= m` (`history[m-t] * (1 + r(t, m-t))`),
    ///    keeping the best `k` and recording each choice in the trellis.
    /// 3. Walk the trellis back from each populated final rank.
    ///
    /// Returns fewer than `k` results when fewer strategies exist, and `k` is
    /// capped at that count before anything is allocated. A zero `k`, or a
    /// grid with no tenors or no months, yields empty results.
    ///
    /// # Errors
    ///
    /// [`OptimiserError::CrfOverflow`] if any compounded CRF is not finite.
    /// [`OptimiserError::ResultsTooLarge`] if the rank tables for `k` cannot
    /// be allocated.
    pub fn optimal_sequences(grid: &ReturnGrid, k: usize) -> Result<OptimalResults, OptimiserError> {
        let num_months = grid.num_months();
        let max_tenor = match grid.max_tenor() {
            Some(tenor) if k > 0 && num_months > 0 => tenor as usize,
            _ => return Ok(OptimalResults::default()),
        };

        // No point tracking more ranks than there are strategies.
        let k = match count_paths(grid.tenors(), num_months) {
            PathCount::Exact(total) => usize::try_from(total).map_or(k, |total| k.min(total)),
            PathCount::Approx(_) => k,
        };

        let window = max_tenor.min(num_months) + 1;
        debug!(
            "optimising {} tenors over {} months for {} results (window {})",
            grid.num_tenors(),
            num_months,
            k,
            window
        );

        let mut history = CrfHistory::new(window, k, num_months)
            .ok_or(OptimiserError::ResultsTooLarge { k, months: window })?;
        let mut num_found = 0;

        // Scoped so the trellis is released as soon as paths are decoded.
        let paths = {
            let mut trellis = DecisionTrellis::new(num_months, k).ok_or(
                OptimiserError::ResultsTooLarge {
                    k,
                    months: num_months + 1,
                },
            )?;

            for month in 1..=num_months {
                history.open_month(month);

                let mut frontier = FrontierQueue::seed(grid, &history, month)?;
                let mut rank = 0;
                while rank < k {
                    let Some(candidate) = frontier.pop(&history)? else {
                        break;
                    };
                    history.set(month, rank, candidate.crf);
                    trellis.record(
                        month,
                        rank,
                        Decision {
                            step: candidate.step,
                            prev_rank: candidate.prev_rank,
                        },
                    );
                    rank += 1;
                }
                num_found = rank;
                trace!("month {}: {} ranks, best CRF {}", month, num_found, history.get(month, 0));
            }

            reconstruct_paths(&trellis, num_found)?
        };

        let crfs = history.row(num_months)[..num_found].to_vec();
        debug!("found {} results", num_found);

        Ok(OptimalResults { crfs, paths })
    }
}
