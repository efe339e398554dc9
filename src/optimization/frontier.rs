use crate::core::return_grid::ReturnGrid;
use crate::optimization::dynamic::{OptimiserError, OverflowDirection};
use crate::optimization::history::CrfHistory;
use crate::optimization::trellis::Step;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Head of one descending candidate stream for a target month.
///
/// The stream for a step `s` yields `history[prev_month][r] * factor` for
/// `r = 0, 1, ...`, so a popped candidate regenerates its successor from
/// `prev_rank + 1` without recomputing the factor.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub crf: f64,
    pub step: Step,
    pub prev_rank: usize,
    pub prev_month: usize,
    pub factor: f64,
}

// Heap order: higher CRF first. Equal CRFs prefer waiting, then the shorter
// tenor, then the lower predecessor rank.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.crf
            .total_cmp(&other.crf)
            .then_with(|| other.step.cmp(&self.step))
            .then_with(|| other.prev_rank.cmp(&self.prev_rank))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Multiply a predecessor CRF by a return factor, failing on non-finite results.
pub fn compound(prev_crf: f64, factor: f64, month: usize) -> Result<f64, OptimiserError> {
    let crf = prev_crf * factor;
    if crf.is_finite() {
        return Ok(crf);
    }
    let direction = if crf.is_sign_negative() {
        OverflowDirection::Negative
    } else {
        OverflowDirection::Positive
    };
    Err(OptimiserError::CrfOverflow { month, direction })
}

/// Bounded k-way merge of the wait stream and every tenor stream that
/// matures at `month`.
#[derive(Debug)]
pub struct FrontierQueue {
    month: usize,
    heap: BinaryHeap<Candidate>,
}

impl FrontierQueue {
    /// Seed the queue with the best candidate of each stream ending at `month`.
    ///
    /// `month` must be at least 1 and every month it refers back to must
    /// still be held by `history`.
    pub fn seed(
        grid: &ReturnGrid,
        history: &CrfHistory,
        month: usize,
    ) -> Result<Self, OptimiserError> {
        debug_assert!(month >= 1, "frontier seeded for month 0");
        let mut heap = BinaryHeap::with_capacity(grid.num_tenors() + 1);

        let wait_month = month - 1;
        heap.push(Candidate {
            crf: history.get(wait_month, 0),
            step: Step::Wait,
            prev_rank: 0,
            prev_month: wait_month,
            factor: 1.0,
        });

        for (row, &tenor) in grid.tenors().iter().enumerate() {
            let span = tenor as usize;
            // Tenors are ascending, so no later tenor fits either.
            if span > month {
                break;
            }
            let prev_month = month - span;
            let factor = 1.0 + grid.return_at(row, prev_month);
            // Waiting always reaches every month, so rank 0 is populated.
            let crf = compound(history.get(prev_month, 0), factor, month)?;
            heap.push(Candidate {
                crf,
                step: Step::Buy(tenor),
                prev_rank: 0,
                prev_month,
                factor,
            });
        }

        Ok(Self { month, heap })
    }

    /// Pop the best remaining candidate and push the next one from its stream.
    ///
    /// A stream ends once its predecessor month has no entry at the next rank.
    pub fn pop(&mut self, history: &CrfHistory) -> Result<Option<Candidate>, OptimiserError> {
        let Some(top) = self.heap.pop() else {
            return Ok(None);
        };

        let next_rank = top.prev_rank + 1;
        let prev_crf = history.get(top.prev_month, next_rank);
        if prev_crf != f64::NEG_INFINITY {
            let crf = compound(prev_crf, top.factor, self.month)?;
            self.heap.push(Candidate {
                crf,
                prev_rank: next_rank,
                ..top
            });
        }

        Ok(Some(top))
    }
}
