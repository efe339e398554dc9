use crate::optimization::matrix::Matrix;

/// Rolling window of the K best CRFs per month.
///
/// Only the last `window` months are kept. A future month can look back at
/// most `max_tenor` months, so `window = min(max_tenor, num_months) + 1`
/// covers every reference. Each row is descending and padded with
/// `f64::NEG_INFINITY` where fewer than K paths reach that month.
#[derive(Debug, Clone)]
pub struct CrfHistory {
    crfs: Matrix<f64>,
    /// Buffer slot holding each month, `slots[m] == m % window`.
    slots: Vec<usize>,
    next_slot: usize,
}

impl CrfHistory {
    /// Create a history with month 0 seeded at CRF 1.0, rank 0.
    ///
    /// Returns `None` if `window x k` CRFs cannot be allocated.
    pub fn new(window: usize, k: usize, num_months: usize) -> Option<Self> {
        debug_assert!(window > 0, "history window must be non-empty");
        let mut crfs = Matrix::try_filled(window, k, f64::NEG_INFINITY)?;
        if k > 0 {
            crfs[(0, 0)] = 1.0;
        }
        Some(Self {
            crfs,
            slots: vec![0; num_months + 1],
            next_slot: 1 % window,
        })
    }

    pub fn window(&self) -> usize {
        self.crfs.rows()
    }

    /// Assign `month` the next slot and clear whatever stale month it held.
    ///
    /// Months must be opened in order, starting at 1.
    pub fn open_month(&mut self, month: usize) {
        let slot = self.next_slot;
        self.slots[month] = slot;
        self.next_slot += 1;
        if self.next_slot == self.window() {
            self.next_slot = 0;
        }
        self.crfs.fill_row(slot, f64::NEG_INFINITY);
    }

    /// CRF at `rank` for `month`; `NEG_INFINITY` if unreached or `rank >= k`.
    #[inline]
    pub fn get(&self, month: usize, rank: usize) -> f64 {
        if rank >= self.crfs.cols() {
            return f64::NEG_INFINITY;
        }
        self.crfs[(self.slots[month], rank)]
    }

    #[inline]
    pub fn set(&mut self, month: usize, rank: usize, crf: f64) {
        self.crfs[(self.slots[month], rank)] = crf;
    }

    /// The full ranked row for `month`.
    pub fn row(&self, month: usize) -> &[f64] {
        self.crfs.row(self.slots[month])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_zero_seeded() {
        let history = CrfHistory::new(3, 2, 5).unwrap();
        assert_eq!(history.get(0, 0), 1.0);
        assert_eq!(history.get(0, 1), f64::NEG_INFINITY);
        assert_eq!(history.get(0, 7), f64::NEG_INFINITY);
    }

    #[test]
    fn test_slots_wrap_like_modulo() {
        let mut history = CrfHistory::new(3, 1, 7).unwrap();
        for month in 1..=7 {
            history.open_month(month);
            history.set(month, 0, month as f64);
        }
        assert_eq!(history.slots, vec![0, 1, 2, 0, 1, 2, 0, 1]);
        // Months 5..=7 are still inside the window.
        assert_eq!(history.get(5, 0), 5.0);
        assert_eq!(history.get(6, 0), 6.0);
        assert_eq!(history.get(7, 0), 7.0);
    }

    #[test]
    fn test_open_month_clears_stale_row() {
        let mut history = CrfHistory::new(2, 2, 3).unwrap();
        history.open_month(1);
        history.set(1, 0, 1.5);
        history.set(1, 1, 1.2);
        history.open_month(2);
        history.set(2, 0, 2.0);
        history.open_month(3);
        assert_eq!(history.row(3), &[f64::NEG_INFINITY, f64::NEG_INFINITY]);
    }

    #[test]
    fn test_single_slot_window() {
        let history = CrfHistory::new(1, 1, 0).unwrap();
        assert_eq!(history.window(), 1);
        assert_eq!(history.get(0, 0), 1.0);
    }
}
