use crate::optimization::matrix::Matrix;

/// How a ranked CRF at some month was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Step {
    /// Held uninvested for one month from the previous month.
    Wait,
    /// Bought a bond of this tenor, maturing at this month.
    Buy(u32),
}

impl Step {
    /// Number of months this step spans.
    pub fn span(self) -> usize {
        match self {
            Step::Wait => 1,
            Step::Buy(tenor) => tenor as usize,
        }
    }
}

/// One trellis cell: the step taken and the rank it extended at the
/// predecessor month (`month - step.span()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub step: Step,
    pub prev_rank: usize,
}

/// Full-horizon table of `(month, rank) -> Decision`.
///
/// Sized `(num_months + 1) x k`. Each cell is written at most once during
/// the forward pass; cells for ranks that no path reached stay `None`.
#[derive(Debug, Clone)]
pub struct DecisionTrellis {
    cells: Matrix<Option<Decision>>,
}

impl DecisionTrellis {
    /// Create a trellis with the month-0 base case recorded at rank 0.
    ///
    /// Returns `None` if the full table cannot be allocated.
    pub fn new(num_months: usize, k: usize) -> Option<Self> {
        let mut cells = Matrix::try_filled(num_months + 1, k, None)?;
        if k > 0 {
            cells[(0, 0)] = Some(Decision {
                step: Step::Wait,
                prev_rank: 0,
            });
        }
        Some(Self { cells })
    }

    pub fn num_months(&self) -> usize {
        self.cells.rows() - 1
    }

    pub fn record(&mut self, month: usize, rank: usize, decision: Decision) {
        let cell = &mut self.cells[(month, rank)];
        debug_assert!(cell.is_none(), "trellis cell ({month}, {rank}) written twice");
        *cell = Some(decision);
    }

    pub fn get(&self, month: usize, rank: usize) -> Option<Decision> {
        if month >= self.cells.rows() || rank >= self.cells.cols() {
            return None;
        }
        self.cells[(month, rank)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_case() {
        let trellis = DecisionTrellis::new(3, 2).unwrap();
        assert_eq!(
            trellis.get(0, 0),
            Some(Decision {
                step: Step::Wait,
                prev_rank: 0
            })
        );
        assert_eq!(trellis.get(0, 1), None);
        assert_eq!(trellis.num_months(), 3);
    }

    #[test]
    fn test_record_and_get() {
        let mut trellis = DecisionTrellis::new(2, 3).unwrap();
        trellis.record(2, 0, Decision { step: Step::Buy(2), prev_rank: 0 });
        trellis.record(2, 1, Decision { step: Step::Wait, prev_rank: 0 });
        assert_eq!(trellis.get(2, 0).map(|d| d.step), Some(Step::Buy(2)));
        assert_eq!(trellis.get(2, 1).map(|d| d.step), Some(Step::Wait));
        assert_eq!(trellis.get(2, 2), None);
        assert_eq!(trellis.get(5, 0), None);
    }

    #[test]
    fn test_step_span() {
        assert_eq!(Step::Wait.span(), 1);
        assert_eq!(Step::Buy(6).span(), 6);
    }
}
