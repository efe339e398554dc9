use crate::core::action::InvestmentAction;
use crate::optimization::dynamic::OptimiserError;
use crate::optimization::trellis::{DecisionTrellis, Step};

/// Decode the strategy ending at `rank` of the final month.
///
/// Walks the trellis backwards from the last month, folding consecutive
/// one-month waits into a single `Wait` action, then reverses the result
/// into chronological order.
pub fn reconstruct_path(
    trellis: &DecisionTrellis,
    rank: usize,
) -> Result<Vec<InvestmentAction>, OptimiserError> {
    let mut path = Vec::new();
    let mut month = trellis.num_months();
    let mut rank = rank;
    let mut wait_run = 0;

    while month > 0 {
        let decision = trellis
            .get(month, rank)
            .ok_or(OptimiserError::UnreachedRank { month, rank })?;

        match decision.step {
            Step::Wait => {
                wait_run += 1;
                month -= 1;
            }
            Step::Buy(tenor) => {
                if wait_run > 0 {
                    path.push(InvestmentAction::wait(month, wait_run));
                    wait_run = 0;
                }
                let span = tenor as usize;
                if span > month {
                    return Err(OptimiserError::UnreachedRank { month, rank });
                }
                month -= span;
                path.push(InvestmentAction::buy(month, span));
            }
        }
        rank = decision.prev_rank;
    }
    if wait_run > 0 {
        path.push(InvestmentAction::wait(0, wait_run));
    }

    path.reverse();
    Ok(path)
}

/// Decode the strategies for final ranks `0..num_found`.
pub fn reconstruct_paths(
    trellis: &DecisionTrellis,
    num_found: usize,
) -> Result<Vec<Vec<InvestmentAction>>, OptimiserError> {
    (0..num_found)
        .map(|rank| reconstruct_path(trellis, rank))
        .collect()
}
