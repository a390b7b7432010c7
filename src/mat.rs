//! Dense, owned, row-major matrices.
//!
//! Subspace blocks in this crate are small and always handled whole, so a
//! plain `Vec`-backed matrix with copying block extraction is all that is
//! needed; the BLAS wrappers in [`linalg`](../linalg/index.html) operate on
//! these directly.
use std::fmt;
use std::ops::{Index, IndexMut, Range};
use num::Zero;
use super::linalg::Conj;

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Mat<T> {
    num_rows: usize,
    num_cols: usize,
    data: Vec<T>,
}

impl<T: fmt::Debug> fmt::Debug for Mat<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries((0 .. self.num_rows).map(|i| self.row(i)))
            .finish()
    }
}

impl<T> Mat<T> {
    pub fn from_vec(num_rows: usize, num_cols: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), num_rows * num_cols);
        Mat { num_rows, num_cols, data }
    }

    /// Build from a list of equally long rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let num_rows = rows.len();
        let num_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in rows {
            assert_eq!(row.len(), num_cols);
            data.extend(row);
        }
        Mat { num_rows, num_cols, data }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.num_rows, self.num_cols)
    }

    /// Distance between consecutive rows in the backing slice.
    #[inline]
    pub fn stride(&self) -> usize {
        self.num_cols
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_rows == 0 || self.num_cols == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.num_rows && j < self.num_cols {
            Some(&self.data[i * self.num_cols + j])
        } else {
            None
        }
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = i * self.num_cols;
        &self.data[start .. start + self.num_cols]
    }
}

impl<T: Clone> Mat<T> {
    /// A copy of the submatrix at the given row and column ranges.
    pub fn slice(&self, rows: Range<usize>, cols: Range<usize>) -> Self {
        assert!(rows.end <= self.num_rows);
        assert!(cols.end <= self.num_cols);
        let num_rows = rows.end - rows.start;
        let num_cols = cols.end - cols.start;
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for i in rows {
            data.extend_from_slice(
                &self.row(i)[cols.start .. cols.end]);
        }
        Mat { num_rows, num_cols, data }
    }

    pub fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0 .. self.num_cols {
            for i in 0 .. self.num_rows {
                data.push(self[(i, j)].clone());
            }
        }
        Mat {
            num_rows: self.num_cols,
            num_cols: self.num_rows,
            data,
        }
    }
}

impl<T: Zero + Clone> Mat<T> {
    pub fn zero(num_rows: usize, num_cols: usize) -> Self {
        Mat {
            num_rows,
            num_cols,
            data: vec![T::zero(); num_rows * num_cols],
        }
    }
}

impl<T: Conj> Mat<T> {
    /// Elementwise complex conjugate.
    pub fn conj(&self) -> Self {
        Mat {
            num_rows: self.num_rows,
            num_cols: self.num_cols,
            data: self.data.iter().map(Conj::conj).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Mat<T> {
    type Output = T;
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.num_rows && j < self.num_cols,
                "index ({}, {}) out of bounds for {}×{} matrix",
                i, j, self.num_rows, self.num_cols);
        &self.data[i * self.num_cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Mat<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.num_rows && j < self.num_cols,
                "index ({}, {}) out of bounds for {}×{} matrix",
                i, j, self.num_rows, self.num_cols);
        &mut self.data[i * self.num_cols + j]
    }
}
