use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors arising from constructing a return grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("tenor must be a positive integer, got {0}")]
    NonPositiveTenor(u32),
    #[error("tenors must be strictly ascending: {previous} is followed by {next}")]
    UnsortedTenors { previous: u32, next: u32 },
    #[error("duplicate tenor {0}")]
    DuplicateTenor(u32),
    #[error("grid size mismatch: {tenors} tenors x {months} months needs {expected} returns, got {actual}")]
    SizeMismatch {
        tenors: usize,
        months: usize,
        expected: usize,
        actual: usize,
    },
    #[error("return for tenor {tenor} at month {month} is not finite once compounded: {value}")]
    NonFiniteReturn { tenor: u32, month: usize, value: f64 },
}

/// Immutable table of per-tenor, per-month bond returns.
///
/// Rows are sorted by ascending tenor, so a scan over tenors for a given
/// month can stop at the first tenor that is longer than the month.
/// `return_at(row, month)` is the return earned by buying the `row`-th
/// tenor at the start of `month`, expressed as a fraction (0.02 = 2%).
///
/// # Examples
///
/// ```
/// use bond_optimiser::core::return_grid::ReturnGrid;
///
/// let grid = ReturnGrid::new(vec![1, 3], 3, vec![
///     0.01, 0.02, 0.00,
///     0.05, 0.04, 0.03,
/// ]).unwrap();
///
/// assert_eq!(grid.max_tenor(), Some(3));
/// assert_eq!(grid.get(1, 0), Some(0.05));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedGrid")]
pub struct ReturnGrid {
    tenors: Vec<u32>,
    num_months: usize,
    /// Row-major returns, one row of `num_months` values per tenor.
    returns: Vec<f64>,
}

/// Wire shape of a grid before validation.
#[derive(Deserialize)]
struct UncheckedGrid {
    tenors: Vec<u32>,
    num_months: usize,
    returns: Vec<f64>,
}

impl TryFrom<UncheckedGrid> for ReturnGrid {
    type Error = GridError;

    fn try_from(raw: UncheckedGrid) -> Result<Self, Self::Error> {
        ReturnGrid::new(raw.tenors, raw.num_months, raw.returns)
    }
}

impl ReturnGrid {
    /// Build a grid from tenors that are already sorted ascending.
    pub fn new(tenors: Vec<u32>, num_months: usize, returns: Vec<f64>) -> Result<Self, GridError> {
        for pair in tenors.windows(2) {
            if pair[1] == pair[0] {
                return Err(GridError::DuplicateTenor(pair[0]));
            }
            if pair[1] < pair[0] {
                return Err(GridError::UnsortedTenors {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        if let Some(&zero) = tenors.iter().find(|&&t| t == 0) {
            return Err(GridError::NonPositiveTenor(zero));
        }

        let expected = tenors.len() * num_months;
        if returns.len() != expected {
            return Err(GridError::SizeMismatch {
                tenors: tenors.len(),
                months: num_months,
                expected,
                actual: returns.len(),
            });
        }

        // The optimiser multiplies by (1 + r), so that is what must stay finite.
        for (i, &value) in returns.iter().enumerate() {
            if !value.is_finite() || !(1.0 + value).is_finite() {
                return Err(GridError::NonFiniteReturn {
                    tenor: tenors[i / num_months],
                    month: i % num_months,
                    value,
                });
            }
        }

        Ok(Self {
            tenors,
            num_months,
            returns,
        })
    }

    /// Build a grid from rows in arbitrary tenor order, sorting them ascending.
    pub fn from_unsorted(
        tenors: Vec<u32>,
        num_months: usize,
        returns: Vec<f64>,
    ) -> Result<Self, GridError> {
        let expected = tenors.len() * num_months;
        if returns.len() != expected {
            return Err(GridError::SizeMismatch {
                tenors: tenors.len(),
                months: num_months,
                expected,
                actual: returns.len(),
            });
        }

        let mut order: Vec<usize> = (0..tenors.len()).collect();
        order.sort_by_key(|&i| tenors[i]);

        let mut sorted_tenors = Vec::with_capacity(tenors.len());
        let mut sorted_returns = Vec::with_capacity(returns.len());
        for &i in &order {
            sorted_tenors.push(tenors[i]);
            sorted_returns.extend_from_slice(&returns[i * num_months..(i + 1) * num_months]);
        }

        Self::new(sorted_tenors, num_months, sorted_returns)
    }

    /// Tenors in ascending order.
    pub fn tenors(&self) -> &[u32] {
        &self.tenors
    }

    pub fn num_tenors(&self) -> usize {
        self.tenors.len()
    }

    pub fn num_months(&self) -> usize {
        self.num_months
    }

    /// The longest tenor, if any.
    pub fn max_tenor(&self) -> Option<u32> {
        self.tenors.last().copied()
    }

    /// Return for the `row`-th tenor bought at `month`.
    ///
    /// Hot-path accessor: bounds are only asserted in debug builds.
    /// Use [`ReturnGrid::get`] when the indices are untrusted.
    #[inline]
    pub fn return_at(&self, row: usize, month: usize) -> f64 {
        debug_assert!(row < self.tenors.len(), "tenor row {row} out of range");
        debug_assert!(month < self.num_months, "month {month} out of range");
        self.returns[row * self.num_months + month]
    }

    /// Bounds-checked version of [`ReturnGrid::return_at`].
    pub fn get(&self, row: usize, month: usize) -> Option<f64> {
        if row >= self.tenors.len() || month >= self.num_months {
            return None;
        }
        Some(self.returns[row * self.num_months + month])
    }

    /// Row index of a given tenor length.
    pub fn tenor_row(&self, tenor: u32) -> Option<usize> {
        self.tenors.binary_search(&tenor).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_lookup() {
        let grid = ReturnGrid::new(vec![1, 2], 2, vec![0.01, 0.02, 0.05, 0.06]).unwrap();
        assert_eq!(grid.num_tenors(), 2);
        assert_eq!(grid.num_months(), 2);
        assert_eq!(grid.return_at(0, 1), 0.02);
        assert_eq!(grid.return_at(1, 0), 0.05);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 2), None);
    }

    #[test]
    fn test_unsorted_rejected() {
        let result = ReturnGrid::new(vec![3, 1], 1, vec![0.0, 0.0]);
        assert_eq!(
            result,
            Err(GridError::UnsortedTenors {
                previous: 3,
                next: 1
            })
        );
    }

    #[test]
    fn test_from_unsorted_sorts_rows() {
        let grid = ReturnGrid::from_unsorted(vec![6, 1, 3], 2, vec![
            0.6, 0.61, //
            0.1, 0.11, //
            0.3, 0.31,
        ])
        .unwrap();
        assert_eq!(grid.tenors(), &[1, 3, 6]);
        assert_eq!(grid.return_at(0, 1), 0.11);
        assert_eq!(grid.return_at(1, 0), 0.3);
        assert_eq!(grid.return_at(2, 1), 0.61);
        assert_eq!(grid.tenor_row(6), Some(2));
    }

    #[test]
    fn test_duplicate_tenor_rejected() {
        let result = ReturnGrid::from_unsorted(vec![2, 1, 2], 1, vec![0.0, 0.0, 0.0]);
        assert_eq!(result, Err(GridError::DuplicateTenor(2)));
    }

    #[test]
    fn test_zero_tenor_rejected() {
        let result = ReturnGrid::new(vec![0, 1], 1, vec![0.0, 0.0]);
        assert_eq!(result, Err(GridError::NonPositiveTenor(0)));
    }

    #[test]
    fn test_size_mismatch() {
        let result = ReturnGrid::new(vec![1, 2], 3, vec![0.0; 5]);
        assert!(matches!(result, Err(GridError::SizeMismatch { expected: 6, actual: 5, .. })));
    }

    #[test]
    fn test_non_finite_return_rejected() {
        let result = ReturnGrid::new(vec![1], 2, vec![0.0, f64::NAN]);
        assert!(matches!(
            result,
            Err(GridError::NonFiniteReturn { tenor: 1, month: 1, .. })
        ));
    }

    #[test]
    fn test_degenerate_grid_allowed() {
        let grid = ReturnGrid::new(Vec::new(), 4, Vec::new()).unwrap();
        assert_eq!(grid.num_tenors(), 0);
        assert_eq!(grid.max_tenor(), None);
    }

    #[test]
    fn test_json_round_trip() {
        let grid = ReturnGrid::new(vec![1, 3], 2, vec![0.01, 0.02, 0.03, 0.04]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let decoded: ReturnGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_json_with_missing_returns_rejected() {
        let err = serde_json::from_str::<ReturnGrid>(
            r#"{"tenors":[1,2],"num_months":3,"returns":[]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("grid size mismatch"));
    }

    #[test]
    fn test_json_with_unsorted_tenors_rejected() {
        let err = serde_json::from_str::<ReturnGrid>(
            r#"{"tenors":[2,1],"num_months":1,"returns":[0.0,0.0]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }
}
