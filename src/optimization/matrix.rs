use std::ops::{Index, IndexMut};

/// Owned row-major 2-D buffer.
///
/// Per-axis bounds are asserted in debug builds only. Release builds keep
/// the single flat-slice check of `Vec` indexing.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Clone> Matrix<T> {
    /// Allocate a `rows x cols` matrix with every cell set to `value`.
    ///
    /// Returns `None` if the cell count overflows or the allocation fails.
    pub fn try_filled(rows: usize, cols: usize, value: T) -> Option<Self> {
        let len = rows.checked_mul(cols)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, value);
        Some(Self { rows, cols, data })
    }

    /// Overwrite every cell of `row` with `value`.
    pub fn fill_row(&mut self, row: usize, value: T) {
        self.row_mut(row).fill(value);
    }
}

impl<T> Matrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        debug_assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        debug_assert!(col < self.cols, "col {col} out of range ({} cols)", self.cols);
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        debug_assert!(row < self.rows, "row {row} out of range ({} rows)", self.rows);
        debug_assert!(col < self.cols, "col {col} out of range ({} cols)", self.cols);
        &mut self.data[row * self.cols + col]
    }
}
